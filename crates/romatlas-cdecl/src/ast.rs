//! Translation-unit interface types.
//!
//! This is the narrow surface the analyzer consumes: function
//! definitions, non-function declarations, and enum definitions, with
//! type chains rendered back to strings. Nothing below the declaration
//! level is preserved.

/// One parsed preprocessed translation unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationUnit {
    pub items: Vec<Item>,
}

/// A top-level item of interest. Prototypes and typedefs produce none.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(FunctionDef),
    Declaration(Declaration),
    Enum(EnumDef),
}

/// A function definition (signature only; the body is skipped).
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub ret: TypeRef,
    pub params: Vec<ParamDecl>,
    pub variadic: bool,
}

/// A formal parameter. Unnamed parameters keep `name: None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub ty: TypeRef,
}

/// A non-function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub ty: TypeRef,
    /// Rendered bit-field width expression, when declared.
    pub bitfield: Option<String>,
}

/// An enum definition, named or anonymous.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: Option<String>,
    pub enumerators: Vec<Enumerator>,
}

/// One enumerator, with its value expression rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<String>,
}

/// A rendered type chain: base specifier text, pointer depth, and array
/// dimensions from outermost to innermost (`None` for `[]`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub base: String,
    pub pointer: usize,
    pub dims: Vec<Option<String>>,
}

impl TypeRef {
    pub fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            pointer: 0,
            dims: Vec::new(),
        }
    }

    /// The innermost array dimension, when one was written out.
    pub fn innermost_dim(&self) -> Option<&str> {
        self.dims.last().and_then(|dim| dim.as_deref())
    }

    /// Render the type the way the databases expect it:
    /// `u8`, `struct Unit *`, `u8 [4]`, `u16 [4][2]`.
    pub fn render(&self) -> String {
        let mut out = self.base.clone();
        if self.pointer > 0 {
            out.push(' ');
            for _ in 0..self.pointer {
                out.push('*');
            }
        }
        for (idx, dim) in self.dims.iter().enumerate() {
            if idx == 0 {
                out.push(' ');
            }
            out.push('[');
            if let Some(expr) = dim {
                out.push_str(expr);
            }
            out.push(']');
        }
        out
    }

    /// Whether this is exactly `void` (no pointers, no arrays).
    pub fn is_void(&self) -> bool {
        self.base == "void" && self.pointer == 0 && self.dims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain() {
        assert_eq!(TypeRef::plain("u8").render(), "u8");
        assert_eq!(TypeRef::plain("struct Unit").render(), "struct Unit");
    }

    #[test]
    fn test_render_pointers() {
        let ty = TypeRef {
            base: "struct Unit".to_string(),
            pointer: 1,
            dims: Vec::new(),
        };
        assert_eq!(ty.render(), "struct Unit *");

        let ty = TypeRef {
            base: "char".to_string(),
            pointer: 2,
            dims: Vec::new(),
        };
        assert_eq!(ty.render(), "char **");
    }

    #[test]
    fn test_render_arrays() {
        let ty = TypeRef {
            base: "u8".to_string(),
            pointer: 0,
            dims: vec![Some("4".to_string()), Some("2".to_string())],
        };
        assert_eq!(ty.render(), "u8 [4][2]");
        assert_eq!(ty.innermost_dim(), Some("2"));

        let ty = TypeRef {
            base: "u16".to_string(),
            pointer: 0,
            dims: vec![None],
        };
        assert_eq!(ty.render(), "u16 []");
        assert_eq!(ty.innermost_dim(), None);
    }

    #[test]
    fn test_void_detection() {
        assert!(TypeRef::plain("void").is_void());
        let ptr = TypeRef {
            base: "void".to_string(),
            pointer: 1,
            dims: Vec::new(),
        };
        assert!(!ptr.is_void());
    }
}
