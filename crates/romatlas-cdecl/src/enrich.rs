//! Second analysis pass: merge facts into the symbol registry.
//!
//! Enrichment never creates symbols. A fact about a name the binary did
//! not export is dropped without comment; a fact about a registered
//! symbol fills in fields the listing could not provide. Constants are
//! the exception: every explicit enumerator value is recorded, whether
//! or not any symbol refers to it.

use romatlas_core::{ConstantTable, Param, ReturnInfo, SymbolTable};
use tracing::debug;

use crate::facts::Fact;

/// Apply extracted facts to the registry and constant table.
pub fn apply_facts(facts: &[Fact], symbols: &mut SymbolTable, constants: &mut ConstantTable) {
    let mut applied = 0usize;
    for fact in facts {
        match fact {
            Fact::Signature { name, ret, params } => {
                let Some(symbol) = symbols.get_mut(name) else {
                    continue;
                };
                symbol.params = Some(
                    params
                        .iter()
                        .map(|(name, ty)| Param {
                            desc: name.clone(),
                            ty: ty.clone(),
                        })
                        .collect(),
                );
                symbol.ret = ret.clone().map(|ty| ReturnInfo { ty });
                applied += 1;
            }
            Fact::DataType { name, ty } => {
                let Some(symbol) = symbols.get_mut(name) else {
                    continue;
                };
                // A local `static` can shadow a code symbol's name; the
                // registry's kind wins. The first declaration seen also
                // wins over later externs.
                if symbol.is_code() || symbol.ty.is_some() {
                    continue;
                }
                symbol.ty = Some(ty.clone());
                applied += 1;
            }
            Fact::Count { name, dim } => {
                let Some(symbol) = symbols.get_mut(name) else {
                    continue;
                };
                symbol.count = Some(dim.clone());
                applied += 1;
            }
            Fact::Constant { name, value } => {
                constants.insert(name, value);
                applied += 1;
            }
        }
    }
    debug!(facts = facts.len(), applied, "merged declaration facts");
}
