//! Projection of the symbol registry into database record trees.
//!
//! One record sequence per map kind, in registry order. Count expressions
//! are evaluated here, and the stored size becomes the per-element size
//! (the registry holds the total byte extent from the binary pass).

use indexmap::IndexMap;

use crate::constants::ConstantTable;
use crate::error::{MapError, MapResult};
use crate::expr;
use crate::symbol::{MapKind, Symbol, SymbolTable};
use crate::value::Value;

/// Build the record sequence for one map kind.
pub fn project_records(
    table: &SymbolTable,
    kind: MapKind,
    constants: &ConstantTable,
) -> MapResult<Value> {
    let mut records = Vec::new();
    for symbol in table.of_kind(kind) {
        records.push(project_symbol(symbol, constants)?);
    }
    Ok(Value::Sequence(records))
}

fn project_symbol(symbol: &Symbol, constants: &ConstantTable) -> MapResult<Value> {
    let mut fields = IndexMap::new();
    fields.insert("desc".to_string(), Value::from(symbol.name.as_str()));
    fields.insert("label".to_string(), Value::from(symbol.name.as_str()));
    fields.insert("addr".to_string(), Value::from(symbol.addr));

    let mut size = symbol.size;
    let mut count = None;
    if let Some(count_expr) = &symbol.count {
        let n = expr::evaluate(count_expr, constants)?;
        if n <= 0 {
            return Err(MapError::expr(
                count_expr.clone(),
                format!("count of {} is {n}, expected a positive integer", symbol.name),
            ));
        }
        size /= n as u64;
        count = Some(n);
    }
    fields.insert("size".to_string(), Value::from(size));

    match symbol.kind {
        MapKind::Code => {
            if let Some(mode) = symbol.mode {
                fields.insert("mode".to_string(), Value::from(mode.name()));
            }
            // A declared-void parameter list projects the same as an
            // undeclared one: no field.
            if let Some(params) = symbol.params.as_deref().filter(|p| !p.is_empty()) {
                let items = params
                    .iter()
                    .map(|p| {
                        let mut var = IndexMap::new();
                        var.insert("desc".to_string(), Value::from(p.desc.as_str()));
                        var.insert("type".to_string(), Value::from(p.ty.as_str()));
                        Value::Mapping(var)
                    })
                    .collect();
                fields.insert("params".to_string(), Value::Sequence(items));
            }
            if let Some(ret) = &symbol.ret {
                let mut var = IndexMap::new();
                var.insert("desc".to_string(), Value::from("result"));
                var.insert("type".to_string(), Value::from(ret.ty.as_str()));
                fields.insert("return".to_string(), Value::Mapping(var));
            }
        }
        MapKind::Data | MapKind::Ram => {
            if let Some(ty) = &symbol.ty {
                fields.insert("type".to_string(), Value::from(ty.as_str()));
            }
            if let Some(n) = count {
                fields.insert("count".to_string(), Value::Int(n));
            }
        }
    }

    if !symbol.line.is_empty() {
        fields.insert("line".to_string(), Value::from(symbol.line.as_str()));
    }
    Ok(Value::Mapping(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{ExecMode, Param, ReturnInfo};

    fn table_with(symbols: Vec<Symbol>) -> SymbolTable {
        let mut table = SymbolTable::new();
        for symbol in symbols {
            table.insert(symbol);
        }
        table
    }

    #[test]
    fn test_code_record_fields() {
        let mut sym = Symbol::new("DoThing", MapKind::Code, 0x800_1000, 0x60, "thing.c:20");
        sym.params = Some(vec![Param {
            desc: "item".to_string(),
            ty: "u16".to_string(),
        }]);
        sym.ret = Some(ReturnInfo {
            ty: "s8".to_string(),
        });
        let db = project_records(&table_with(vec![sym]), MapKind::Code, &ConstantTable::new())
            .unwrap();

        let record = &db.as_sequence().unwrap()[0];
        assert_eq!(record.get("desc"), Some(&Value::from("DoThing")));
        assert_eq!(record.get("label"), Some(&Value::from("DoThing")));
        assert_eq!(record.get("addr"), Some(&Value::Int(0x800_1000)));
        assert_eq!(record.get("mode"), Some(&Value::from("thumb")));
        assert_eq!(record.get("line"), Some(&Value::from("thing.c:20")));
        let ret = record.get("return").unwrap();
        assert_eq!(ret.get("desc"), Some(&Value::from("result")));
        assert_eq!(ret.get("type"), Some(&Value::from("s8")));
    }

    #[test]
    fn test_arm_mode_survives_projection() {
        let mut sym = Symbol::new("ARM_Handler", MapKind::Code, 0x800_3000, 0x94, "");
        sym.mode = Some(ExecMode::Arm);
        let db = project_records(&table_with(vec![sym]), MapKind::Code, &ConstantTable::new())
            .unwrap();
        let record = &db.as_sequence().unwrap()[0];
        assert_eq!(record.get("mode"), Some(&Value::from("arm")));
        assert_eq!(record.get("line"), None, "empty line hint is omitted");
    }

    #[test]
    fn test_void_param_list_is_omitted() {
        let mut sym = Symbol::new("Step", MapKind::Code, 0x800_0100, 0x10, "");
        sym.params = Some(Vec::new());
        let db = project_records(&table_with(vec![sym]), MapKind::Code, &ConstantTable::new())
            .unwrap();
        let record = &db.as_sequence().unwrap()[0];
        assert_eq!(record.get("params"), None);
        assert_eq!(record.get("return"), None);
    }

    #[test]
    fn test_count_divides_size() {
        let mut constants = ConstantTable::new();
        constants.insert("MAX_UNITS", "0x33");

        let mut sym = Symbol::new("gUnits", MapKind::Ram, 0x200_0100, 0x48 * 0x33, "");
        sym.ty = Some("Unit".to_string());
        sym.count = Some("MAX_UNITS".to_string());
        let db = project_records(&table_with(vec![sym]), MapKind::Ram, &constants).unwrap();

        let record = &db.as_sequence().unwrap()[0];
        assert_eq!(record.get("count"), Some(&Value::Int(0x33)));
        assert_eq!(record.get("size"), Some(&Value::Int(0x48)));
        assert_eq!(record.get("type"), Some(&Value::from("Unit")));
    }

    #[test]
    fn test_nonpositive_count_is_fatal() {
        let mut sym = Symbol::new("gBad", MapKind::Data, 0x80A_0000, 4, "");
        sym.ty = Some("u8".to_string());
        sym.count = Some("2 - 2".to_string());
        let result = project_records(&table_with(vec![sym]), MapKind::Data, &ConstantTable::new());
        assert!(matches!(result, Err(MapError::Expr { .. })));
    }

    #[test]
    fn test_kinds_are_separated() {
        let table = table_with(vec![
            Symbol::new("Main", MapKind::Code, 0x800_0000, 4, ""),
            Symbol::new("gData", MapKind::Data, 0x80A_0000, 4, ""),
        ]);
        let constants = ConstantTable::new();
        let code = project_records(&table, MapKind::Code, &constants).unwrap();
        let data = project_records(&table, MapKind::Data, &constants).unwrap();
        assert_eq!(code.as_sequence().unwrap().len(), 1);
        assert_eq!(data.as_sequence().unwrap().len(), 1);
        assert_eq!(
            data.as_sequence().unwrap()[0].get("desc"),
            Some(&Value::from("gData"))
        );
    }
}
