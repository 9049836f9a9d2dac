//! First analysis pass: reduce a translation unit to flat facts.
//!
//! Facts are pure observations about what the source declares. They carry
//! no knowledge of the symbol registry; deciding which facts apply is the
//! merge pass in [`crate::enrich`].

use crate::ast::{Item, TranslationUnit};

/// One observation extracted from a translation unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Fact {
    /// A function definition's signature.
    Signature {
        name: String,
        /// Rendered return type; `None` when the function returns `void`.
        ret: Option<String>,
        /// `(name, type)` pairs in declaration order.
        params: Vec<(String, String)>,
    },
    /// A data declaration's type.
    DataType { name: String, ty: String },
    /// A data declaration's innermost array dimension, as written.
    Count { name: String, dim: String },
    /// An enumerator with an explicit value expression.
    Constant { name: String, value: String },
}

/// Extract every fact a translation unit states.
pub fn extract_facts(unit: &TranslationUnit) -> Vec<Fact> {
    let mut facts = Vec::new();
    for item in &unit.items {
        match item {
            Item::Function(func) => {
                let ret = if func.ret.is_void() {
                    None
                } else {
                    Some(func.ret.render())
                };
                let mut params: Vec<(String, String)> = func
                    .params
                    .iter()
                    .filter(|param| !param.ty.is_void())
                    .filter_map(|param| {
                        param
                            .name
                            .as_ref()
                            .map(|name| (name.clone(), param.ty.render()))
                    })
                    .collect();
                if func.variadic {
                    params.push(("...".to_string(), "varargs".to_string()));
                }
                facts.push(Fact::Signature {
                    name: func.name.clone(),
                    ret,
                    params,
                });
            }
            Item::Declaration(decl) => {
                let mut ty = decl.ty.render();
                if let Some(width) = &decl.bitfield {
                    ty.push(':');
                    ty.push_str(width);
                }
                facts.push(Fact::DataType {
                    name: decl.name.clone(),
                    ty,
                });
                if let Some(dim) = decl.ty.innermost_dim() {
                    facts.push(Fact::Count {
                        name: decl.name.clone(),
                        dim: dim.to_string(),
                    });
                }
            }
            Item::Enum(def) => {
                for enumerator in &def.enumerators {
                    if let Some(value) = &enumerator.value {
                        facts.push(Fact::Constant {
                            name: enumerator.name.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }
    facts
}
