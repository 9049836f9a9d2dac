//! Recursive-descent reader for top-level C declarations.
//!
//! This reads one preprocessed translation unit and keeps only what the
//! analyzer needs: function definition signatures, non-function
//! declarations, and enum definitions. Function bodies, struct/union
//! bodies, and initializers are skipped over balanced brackets;
//! prototypes and typedefs are recognized and dropped. Anything the reader cannot make sense of is a
//! fatal error with a line number.

use crate::ast::{
    Declaration, EnumDef, Enumerator, FunctionDef, Item, ParamDecl, TranslationUnit, TypeRef,
};
use crate::lexer::{render_tokens, tokenize, ParseError, ParseResult, Spanned, Token};

const STORAGE: &[&str] = &[
    "typedef", "static", "extern", "register", "auto", "inline", "__inline", "__inline__",
];
const QUALIFIERS: &[&str] = &["const", "volatile", "__const", "__volatile__", "restrict"];
const BASE_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool",
];

/// Parse a preprocessed translation unit.
pub fn parse_translation_unit(src: &str) -> ParseResult<TranslationUnit> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut items = Vec::new();
    while parser.peek().is_some() {
        if parser.eat_punct(";") {
            continue;
        }
        parser.parse_external(&mut items)?;
    }
    Ok(TranslationUnit { items })
}

struct Specifiers {
    base: String,
    is_typedef: bool,
    enum_def: Option<EnumDef>,
}

struct Declarator {
    name: Option<String>,
    pointer: usize,
    dims: Vec<Option<String>>,
    bitfield: Option<String>,
    /// Parameter list when this declares a function.
    params: Option<(Vec<ParamDecl>, bool)>,
    /// The declarator was a parenthesized function pointer.
    funcptr: bool,
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|s| s.line)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> ParseResult<Token> {
        let spanned = self.tokens.get(self.pos).ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(spanned.token.clone())
    }

    fn peek_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.peek_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: &str) -> ParseResult<()> {
        if self.eat_punct(punct) {
            return Ok(());
        }
        Err(ParseError::UnexpectedToken {
            line: self.line(),
            expected: format!("`{punct}`"),
            got: self
                .peek()
                .map(|t| format!("`{}`", t.text()))
                .unwrap_or_else(|| "end of input".to_string()),
        })
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                line: self.line(),
                expected: "identifier".to_string(),
                got: format!("`{}`", other.text()),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_external(&mut self, items: &mut Vec<Item>) -> ParseResult<()> {
        let specs = self.parse_specifiers()?;
        if let Some(enum_def) = specs.enum_def.clone() {
            items.push(Item::Enum(enum_def));
        }
        // Bare type definition: `struct Unit { ... };` or `enum { ... };`
        if self.eat_punct(";") {
            return Ok(());
        }

        loop {
            let decl = self.parse_declarator()?;
            if let Some((params, variadic)) = decl.params {
                // A body makes this a definition; a `;` makes it a
                // prototype, which contributes nothing.
                if self.peek_punct("{") {
                    let name = decl.name.ok_or_else(|| {
                        ParseError::syntax(self.line(), "function definition without a name")
                    })?;
                    self.skip_balanced("{", "}")?;
                    items.push(Item::Function(FunctionDef {
                        name,
                        ret: TypeRef {
                            base: specs.base,
                            pointer: decl.pointer,
                            dims: Vec::new(),
                        },
                        params,
                        variadic,
                    }));
                    return Ok(());
                }
            } else if !specs.is_typedef {
                if let Some(name) = decl.name {
                    let base = if decl.funcptr {
                        format!("{} (*)()", specs.base)
                    } else {
                        specs.base.clone()
                    };
                    items.push(Item::Declaration(Declaration {
                        name,
                        ty: TypeRef {
                            base,
                            pointer: if decl.funcptr { 0 } else { decl.pointer },
                            dims: decl.dims,
                        },
                        bitfield: decl.bitfield,
                    }));
                }
            }
            if self.eat_punct("=") {
                self.skip_initializer()?;
            }
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(";")?;
            return Ok(());
        }
    }

    fn parse_specifiers(&mut self) -> ParseResult<Specifiers> {
        let mut words: Vec<String> = Vec::new();
        let mut is_typedef = false;
        let mut enum_def = None;
        let mut have_base = false;

        while let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            if STORAGE.contains(&name.as_str()) {
                self.pos += 1;
                is_typedef |= name == "typedef";
            } else if QUALIFIERS.contains(&name.as_str()) {
                self.pos += 1;
                words.push(name);
            } else if name == "__attribute__" {
                self.pos += 1;
                self.skip_balanced("(", ")")?;
            } else if name == "struct" || name == "union" {
                self.pos += 1;
                words.push(name);
                if let Some(Token::Ident(tag)) = self.peek() {
                    words.push(tag.clone());
                    self.pos += 1;
                }
                if self.peek_punct("{") {
                    // Member declarations carry no project significance.
                    self.skip_balanced("{", "}")?;
                }
                have_base = true;
            } else if name == "enum" {
                self.pos += 1;
                words.push(name);
                let mut tag = None;
                if let Some(Token::Ident(t)) = self.peek() {
                    words.push(t.clone());
                    tag = Some(t.clone());
                    self.pos += 1;
                }
                if self.peek_punct("{") {
                    enum_def = Some(self.parse_enum_body(tag)?);
                }
                have_base = true;
            } else if BASE_KEYWORDS.contains(&name.as_str()) {
                self.pos += 1;
                words.push(name);
                have_base = true;
            } else if !have_base {
                // A typedef'd type name.
                self.pos += 1;
                words.push(name);
                have_base = true;
            } else {
                break;
            }
        }

        if words.is_empty() {
            return Err(ParseError::syntax(self.line(), "expected a declaration"));
        }
        Ok(Specifiers {
            base: words.join(" "),
            is_typedef,
            enum_def,
        })
    }

    fn parse_enum_body(&mut self, name: Option<String>) -> ParseResult<EnumDef> {
        self.expect_punct("{")?;
        let mut enumerators = Vec::new();
        loop {
            if self.eat_punct("}") {
                break;
            }
            let name = self.expect_ident()?;
            let value = if self.eat_punct("=") {
                let tokens = self.capture_expr(&[",", "}"])?;
                Some(render_tokens(&tokens))
            } else {
                None
            };
            enumerators.push(Enumerator { name, value });
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct("}")?;
            break;
        }
        Ok(EnumDef { name, enumerators })
    }

    fn parse_declarator(&mut self) -> ParseResult<Declarator> {
        let pointer = self.parse_pointers();

        // Parenthesized function-pointer declarator: `(*name[dims])(...)`.
        if self.peek_punct("(") && matches!(self.peek_at(1), Some(Token::Punct("*"))) {
            self.pos += 1;
            self.parse_pointers();
            let name = match self.peek() {
                Some(Token::Ident(n)) => {
                    let n = n.clone();
                    self.pos += 1;
                    Some(n)
                }
                _ => None,
            };
            let dims = self.parse_dims()?;
            self.expect_punct(")")?;
            self.expect_punct("(")?;
            self.skip_to_close("(", ")")?;
            return Ok(Declarator {
                name,
                pointer,
                dims,
                bitfield: None,
                params: None,
                funcptr: true,
            });
        }

        let name = match self.peek() {
            Some(Token::Ident(n)) => {
                let n = n.clone();
                self.pos += 1;
                Some(n)
            }
            _ => None,
        };
        let dims = self.parse_dims()?;
        let params = if self.eat_punct("(") {
            Some(self.parse_params()?)
        } else {
            None
        };
        let bitfield = if params.is_none() && self.eat_punct(":") {
            let tokens = self.capture_expr(&[",", ";"])?;
            Some(render_tokens(&tokens))
        } else {
            None
        };
        if let Some(Token::Ident(name)) = self.peek() {
            if name == "__attribute__" {
                self.pos += 1;
                self.skip_balanced("(", ")")?;
            }
        }
        Ok(Declarator {
            name,
            pointer,
            dims,
            bitfield,
            params,
            funcptr: false,
        })
    }

    fn parse_pointers(&mut self) -> usize {
        let mut pointer = 0;
        loop {
            if self.eat_punct("*") {
                pointer += 1;
            } else if let Some(Token::Ident(name)) = self.peek() {
                if pointer > 0 && QUALIFIERS.contains(&name.as_str()) {
                    self.pos += 1;
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        pointer
    }

    fn parse_dims(&mut self) -> ParseResult<Vec<Option<String>>> {
        let mut dims = Vec::new();
        while self.eat_punct("[") {
            if self.eat_punct("]") {
                dims.push(None);
                continue;
            }
            let tokens = self.capture_expr(&["]"])?;
            self.expect_punct("]")?;
            dims.push(Some(render_tokens(&tokens)));
        }
        Ok(dims)
    }

    fn parse_params(&mut self) -> ParseResult<(Vec<ParamDecl>, bool)> {
        let mut params = Vec::new();
        let mut variadic = false;
        if self.eat_punct(")") {
            return Ok((params, variadic));
        }
        loop {
            if self.eat_punct("...") {
                variadic = true;
                self.expect_punct(")")?;
                break;
            }
            let specs = self.parse_specifiers()?;
            let pointer = self.parse_pointers();
            let (name, base, dims) = if self.peek_punct("(") {
                // Function-pointer parameter: take the declarator name from
                // inside the parentheses, drop the signature.
                let inner = self.skip_balanced_collect("(", ")")?;
                let name = inner.iter().rev().find_map(|t| match t {
                    Token::Ident(n) if !QUALIFIERS.contains(&n.as_str()) => Some(n.clone()),
                    _ => None,
                });
                if self.peek_punct("(") {
                    self.skip_balanced("(", ")")?;
                }
                (name, format!("{} (*)()", specs.base), Vec::new())
            } else {
                let name = match self.peek() {
                    Some(Token::Ident(n)) => {
                        let n = n.clone();
                        self.pos += 1;
                        Some(n)
                    }
                    _ => None,
                };
                (name, specs.base, self.parse_dims()?)
            };
            params.push(ParamDecl {
                name,
                ty: TypeRef {
                    base,
                    pointer,
                    dims,
                },
            });
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(")")?;
            break;
        }
        Ok((params, variadic))
    }

    /// Skip an initializer up to an unnested `,` or `;`, which is left in
    /// place. Brace groups nest, so aggregate initializers are consumed
    /// whole.
    fn skip_initializer(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::UnexpectedEof);
            };
            if let Token::Punct(p) = token {
                match *p {
                    "," | ";" if depth == 0 => return Ok(()),
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            return Err(ParseError::UnexpectedToken {
                                line: self.line(),
                                expected: "`;`".to_string(),
                                got: format!("`{p}`"),
                            });
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
            }
            self.pos += 1;
        }
    }

    /// Capture expression tokens up to an unnested stop punct, which is
    /// left in place.
    fn capture_expr(&mut self, stops: &[&str]) -> ParseResult<Vec<Token>> {
        let mut depth = 0usize;
        let mut out = Vec::new();
        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::UnexpectedEof);
            };
            if let Token::Punct(p) = token {
                if depth == 0 && stops.contains(p) {
                    return Ok(out);
                }
                match *p {
                    "(" | "[" => depth += 1,
                    ")" | "]" => {
                        if depth == 0 {
                            return Ok(out);
                        }
                        depth -= 1;
                    }
                    _ => {}
                }
            }
            out.push(self.advance()?);
        }
    }

    /// Skip a balanced `open ... close` group, starting at `open`.
    fn skip_balanced(&mut self, open: &str, close: &str) -> ParseResult<()> {
        self.skip_balanced_collect(open, close).map(|_| ())
    }

    fn skip_balanced_collect(&mut self, open: &str, close: &str) -> ParseResult<Vec<Token>> {
        self.expect_punct(open)?;
        self.collect_to_close(open, close)
    }

    /// Skip to the close of an already-opened group.
    fn skip_to_close(&mut self, open: &str, close: &str) -> ParseResult<()> {
        self.collect_to_close(open, close).map(|_| ())
    }

    fn collect_to_close(&mut self, open: &str, close: &str) -> ParseResult<Vec<Token>> {
        let mut depth = 1usize;
        let mut out = Vec::new();
        loop {
            let token = self.advance()?;
            if let Token::Punct(p) = token {
                if p == open {
                    depth += 1;
                } else if p == close {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                }
            }
            out.push(token);
        }
    }
}
