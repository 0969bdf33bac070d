use std::fmt;

use serde::Serialize;

use crate::error::SyntaxError;

#[derive(Debug, Clone, Serialize)]
pub struct ParseTree {
    pub modules: Vec<ModuleNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleNode {
    pub name: String,
    pub tag_default: Option<String>,
    pub imports: Vec<ImportNode>,
    pub assignments: Vec<AssignmentNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportNode {
    pub symbols: Vec<String>,
    pub from_module: String,
}

#[derive(Debug, Clone, Serialize)]
pub enum AssignmentNode {
    Type {
        name: String,
        ty: TypeNode,
    },
    Value {
        name: String,
        ty: TypeNode,
        value: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedNumber {
    pub name: String,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Component {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub enum TypeNode {
    Boolean,
    Null,
    Real,
    Integer {
        named_numbers: Vec<NamedNumber>,
    },
    Enumerated {
        items: Vec<NamedNumber>,
        extensible: bool,
    },
    BitString,
    OctetString,
    ObjectIdentifier,
    CharacterString {
        kind: String,
    },
    Sequence {
        components: Vec<Component>,
        extensible: bool,
    },
    Set {
        components: Vec<Component>,
        extensible: bool,
    },
    SequenceOf {
        size: Option<String>,
        element: Box<TypeNode>,
    },
    SetOf {
        size: Option<String>,
        element: Box<TypeNode>,
    },
    Choice {
        alternatives: Vec<Component>,
        extensible: bool,
    },
    Tagged {
        class: Option<String>,
        number: i64,
        mode: Option<String>,
        inner: Box<TypeNode>,
    },
    Constrained {
        constraint: String,
        base: Box<TypeNode>,
    },
    Reference {
        name: String,
    },
}

const CHARACTER_STRING_KINDS: &[&str] = &[
    "UTF8String",
    "IA5String",
    "PrintableString",
    "VisibleString",
    "NumericString",
    "GeneralString",
    "TeletexString",
    "BMPString",
    "GeneralizedTime",
    "UTCTime",
];

pub fn parse_asn1(text: &str) -> Result<ParseTree, SyntaxError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut modules = Vec::new();
    while parser.peek().is_some() {
        modules.push(parser.module()?);
    }
    if modules.is_empty() {
        return Err(SyntaxError {
            line: 1,
            column: 1,
            message: "expected a module definition".to_string(),
        });
    }
    Ok(ParseTree { modules })
}

/// Diagnostic textual form of the parse tree, printed by `--parse`.
pub fn render_parse_tree(tree: &ParseTree) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tree)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pos {
    line: usize,
    column: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Number(i64),
    Text(String),
    Assign,
    Range,
    Ellipsis,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Pipe,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Ident(name) => write!(f, "{name}"),
            Tok::Number(value) => write!(f, "{value}"),
            Tok::Text(text) => write!(f, "\"{text}\""),
            Tok::Assign => write!(f, "::="),
            Tok::Range => write!(f, ".."),
            Tok::Ellipsis => write!(f, "..."),
            Tok::LBrace => write!(f, "{{"),
            Tok::RBrace => write!(f, "}}"),
            Tok::LParen => write!(f, "("),
            Tok::RParen => write!(f, ")"),
            Tok::LBracket => write!(f, "["),
            Tok::RBracket => write!(f, "]"),
            Tok::Comma => write!(f, ","),
            Tok::Semicolon => write!(f, ";"),
            Tok::Pipe => write!(f, "|"),
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
}

fn tokenize(text: &str) -> Result<Vec<(Tok, Pos)>, SyntaxError> {
    let mut lexer = Lexer {
        chars: text.chars().collect(),
        index: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();

    while let Some(ch) = lexer.peek() {
        let pos = Pos {
            line: lexer.line,
            column: lexer.column,
        };

        if ch.is_whitespace() {
            lexer.bump();
            continue;
        }

        if ch == '-' && lexer.peek_at(1) == Some('-') {
            lexer.bump();
            lexer.bump();
            // A comment runs to end of line or to a closing "--".
            loop {
                match lexer.peek() {
                    None | Some('\n') => break,
                    Some('-') if lexer.peek_at(1) == Some('-') => {
                        lexer.bump();
                        lexer.bump();
                        break;
                    }
                    Some(_) => {
                        lexer.bump();
                    }
                }
            }
            continue;
        }

        if is_ident_start(ch) {
            let mut name = String::new();
            while let Some(ch) = lexer.peek() {
                if is_ident_continue(ch) {
                    name.push(ch);
                    lexer.bump();
                } else if ch == '-' && lexer.peek_at(1).is_some_and(is_ident_continue) {
                    name.push('-');
                    lexer.bump();
                } else {
                    break;
                }
            }
            tokens.push((Tok::Ident(name), pos));
            continue;
        }

        if ch.is_ascii_digit() || (ch == '-' && lexer.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            let mut digits = String::new();
            if ch == '-' {
                digits.push('-');
                lexer.bump();
            }
            while let Some(ch) = lexer.peek() {
                if ch.is_ascii_digit() {
                    digits.push(ch);
                    lexer.bump();
                } else {
                    break;
                }
            }
            let value = digits
                .parse::<i64>()
                .map_err(|_| lexer.error(format!("number out of range: {digits}")))?;
            tokens.push((Tok::Number(value), pos));
            continue;
        }

        match ch {
            ':' => {
                lexer.bump();
                if lexer.bump() != Some(':') || lexer.bump() != Some('=') {
                    return Err(lexer.error("expected '::='"));
                }
                tokens.push((Tok::Assign, pos));
            }
            '.' => {
                lexer.bump();
                if lexer.peek() == Some('.') {
                    lexer.bump();
                    if lexer.peek() == Some('.') {
                        lexer.bump();
                        tokens.push((Tok::Ellipsis, pos));
                    } else {
                        tokens.push((Tok::Range, pos));
                    }
                } else {
                    return Err(lexer.error("unexpected character '.'"));
                }
            }
            '"' => {
                lexer.bump();
                let mut text = String::new();
                loop {
                    match lexer.bump() {
                        Some('"') => break,
                        Some(ch) => text.push(ch),
                        None => return Err(lexer.error("unterminated string literal")),
                    }
                }
                tokens.push((Tok::Text(text), pos));
            }
            '\'' => {
                lexer.bump();
                let mut text = String::new();
                loop {
                    match lexer.bump() {
                        Some('\'') => break,
                        Some(ch) => text.push(ch),
                        None => return Err(lexer.error("unterminated bstring literal")),
                    }
                }
                // Trailing B or H radix marker.
                if lexer.peek().is_some_and(|c| c == 'B' || c == 'H') {
                    lexer.bump();
                }
                tokens.push((Tok::Text(text), pos));
            }
            '{' => {
                lexer.bump();
                tokens.push((Tok::LBrace, pos));
            }
            '}' => {
                lexer.bump();
                tokens.push((Tok::RBrace, pos));
            }
            '(' => {
                lexer.bump();
                tokens.push((Tok::LParen, pos));
            }
            ')' => {
                lexer.bump();
                tokens.push((Tok::RParen, pos));
            }
            '[' => {
                lexer.bump();
                tokens.push((Tok::LBracket, pos));
            }
            ']' => {
                lexer.bump();
                tokens.push((Tok::RBracket, pos));
            }
            ',' => {
                lexer.bump();
                tokens.push((Tok::Comma, pos));
            }
            ';' => {
                lexer.bump();
                tokens.push((Tok::Semicolon, pos));
            }
            '|' => {
                lexer.bump();
                tokens.push((Tok::Pipe, pos));
            }
            other => return Err(lexer.error(format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Tok, Pos)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn bump(&mut self) -> Option<(Tok, Pos)> {
        let entry = self.tokens.get(self.pos).cloned();
        if entry.is_some() {
            self.pos += 1;
        }
        entry
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let pos = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, pos)| *pos)
            .unwrap_or(Pos { line: 1, column: 1 });
        SyntaxError {
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, what: &str) -> Result<(), SyntaxError> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.describe_unexpected(what))
        }
    }

    fn describe_unexpected(&self, what: &str) -> SyntaxError {
        match self.peek() {
            Some(found) => self.error(format!("expected {what}, found '{found}'")),
            None => self.error(format!("expected {what}, found end of input")),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), SyntaxError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.describe_unexpected(&format!("'{keyword}'")))
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek() {
            Some(Tok::Ident(_)) => match self.bump() {
                Some((Tok::Ident(name), _)) => Ok(name),
                _ => Err(self.describe_unexpected(what)),
            },
            _ => Err(self.describe_unexpected(what)),
        }
    }

    fn number(&mut self, what: &str) -> Result<i64, SyntaxError> {
        match self.peek() {
            Some(Tok::Number(_)) => match self.bump() {
                Some((Tok::Number(value), _)) => Ok(value),
                _ => Err(self.describe_unexpected(what)),
            },
            _ => Err(self.describe_unexpected(what)),
        }
    }

    /// Consumes a balanced group starting at `open` and returns its verbatim
    /// token text, outer delimiters included.
    fn capture_balanced(&mut self, open: Tok, close: Tok) -> Result<String, SyntaxError> {
        self.expect(&open, &format!("'{open}'"))?;
        let mut depth = 1usize;
        let mut parts = vec![open.to_string()];
        while depth > 0 {
            match self.bump() {
                Some((tok, _)) => {
                    if tok == open {
                        depth += 1;
                    } else if tok == close {
                        depth -= 1;
                    }
                    parts.push(tok.to_string());
                }
                None => return Err(self.error("unexpected end of input")),
            }
        }
        Ok(parts.join(" "))
    }

    fn skip_balanced(&mut self, open: Tok, close: Tok) -> Result<(), SyntaxError> {
        self.capture_balanced(open, close).map(|_| ())
    }

    fn module(&mut self) -> Result<ModuleNode, SyntaxError> {
        let name = self.ident("a module reference")?;
        if !starts_uppercase(&name) {
            return Err(self.error(format!("module reference must be capitalized: {name}")));
        }
        if matches!(self.peek(), Some(Tok::LBrace)) {
            self.skip_balanced(Tok::LBrace, Tok::RBrace)?;
        }
        self.expect_keyword("DEFINITIONS")?;

        let mut tag_default = None;
        for mode in ["EXPLICIT", "IMPLICIT", "AUTOMATIC"] {
            if self.eat_keyword(mode) {
                self.expect_keyword("TAGS")?;
                tag_default = Some(mode.to_string());
                break;
            }
        }

        self.expect(&Tok::Assign, "'::='")?;
        self.expect_keyword("BEGIN")?;

        if self.eat_keyword("EXPORTS") {
            while !self.eat(&Tok::Semicolon) {
                if self.bump().is_none() {
                    return Err(self.error("unexpected end of input in EXPORTS"));
                }
            }
        }

        let imports = if self.eat_keyword("IMPORTS") {
            self.imports()?
        } else {
            Vec::new()
        };

        let mut assignments = Vec::new();
        while !self.eat_keyword("END") {
            if self.peek().is_none() {
                return Err(self.error("unexpected end of input, expected 'END'"));
            }
            assignments.push(self.assignment()?);
        }

        Ok(ModuleNode {
            name,
            tag_default,
            imports,
            assignments,
        })
    }

    fn imports(&mut self) -> Result<Vec<ImportNode>, SyntaxError> {
        let mut imports = Vec::new();
        loop {
            if self.eat(&Tok::Semicolon) {
                break;
            }
            let mut symbols = vec![self.ident("an imported symbol")?];
            while self.eat(&Tok::Comma) {
                symbols.push(self.ident("an imported symbol")?);
            }
            self.expect_keyword("FROM")?;
            let from_module = self.ident("a module reference")?;
            if matches!(self.peek(), Some(Tok::LBrace)) {
                self.skip_balanced(Tok::LBrace, Tok::RBrace)?;
            }
            imports.push(ImportNode {
                symbols,
                from_module,
            });
        }
        Ok(imports)
    }

    fn assignment(&mut self) -> Result<AssignmentNode, SyntaxError> {
        let name = self.ident("an assignment")?;
        if starts_uppercase(&name) {
            self.expect(&Tok::Assign, "'::='")?;
            let ty = self.ty()?;
            Ok(AssignmentNode::Type { name, ty })
        } else {
            let ty = self.ty()?;
            self.expect(&Tok::Assign, "'::='")?;
            let value = self.value()?;
            Ok(AssignmentNode::Value { name, ty, value })
        }
    }

    fn ty(&mut self) -> Result<TypeNode, SyntaxError> {
        let mut node = if matches!(self.peek(), Some(Tok::LBracket)) {
            self.tagged_type()?
        } else {
            self.base_type()?
        };
        while matches!(self.peek(), Some(Tok::LParen)) {
            let constraint = self.capture_balanced(Tok::LParen, Tok::RParen)?;
            node = TypeNode::Constrained {
                constraint,
                base: Box::new(node),
            };
        }
        Ok(node)
    }

    fn tagged_type(&mut self) -> Result<TypeNode, SyntaxError> {
        self.expect(&Tok::LBracket, "'['")?;
        let mut class = None;
        for candidate in ["UNIVERSAL", "APPLICATION", "PRIVATE"] {
            if self.eat_keyword(candidate) {
                class = Some(candidate.to_string());
                break;
            }
        }
        let number = self.number("a tag number")?;
        self.expect(&Tok::RBracket, "']'")?;
        let mut mode = None;
        for candidate in ["IMPLICIT", "EXPLICIT"] {
            if self.eat_keyword(candidate) {
                mode = Some(candidate.to_string());
                break;
            }
        }
        let inner = self.ty()?;
        Ok(TypeNode::Tagged {
            class,
            number,
            mode,
            inner: Box::new(inner),
        })
    }

    fn base_type(&mut self) -> Result<TypeNode, SyntaxError> {
        let name = match self.peek() {
            Some(Tok::Ident(name)) => name.clone(),
            _ => return Err(self.describe_unexpected("a type")),
        };
        self.pos += 1;

        match name.as_str() {
            "BOOLEAN" => Ok(TypeNode::Boolean),
            "NULL" => Ok(TypeNode::Null),
            "REAL" => Ok(TypeNode::Real),
            "INTEGER" => {
                let named_numbers = if matches!(self.peek(), Some(Tok::LBrace)) {
                    self.named_number_list()?.0
                } else {
                    Vec::new()
                };
                Ok(TypeNode::Integer { named_numbers })
            }
            "ENUMERATED" => {
                let (items, extensible) = self.named_number_list()?;
                Ok(TypeNode::Enumerated { items, extensible })
            }
            "BIT" => {
                self.expect_keyword("STRING")?;
                if matches!(self.peek(), Some(Tok::LBrace)) {
                    self.skip_balanced(Tok::LBrace, Tok::RBrace)?;
                }
                Ok(TypeNode::BitString)
            }
            "OCTET" => {
                self.expect_keyword("STRING")?;
                Ok(TypeNode::OctetString)
            }
            "OBJECT" => {
                self.expect_keyword("IDENTIFIER")?;
                Ok(TypeNode::ObjectIdentifier)
            }
            "SEQUENCE" => self.seq_like(true),
            "SET" => self.seq_like(false),
            "CHOICE" => {
                let (alternatives, extensible) = self.component_list()?;
                Ok(TypeNode::Choice {
                    alternatives,
                    extensible,
                })
            }
            _ if CHARACTER_STRING_KINDS.contains(&name.as_str()) => {
                Ok(TypeNode::CharacterString { kind: name })
            }
            _ if starts_uppercase(&name) => Ok(TypeNode::Reference { name }),
            _ => Err(self.error(format!("expected a type, found '{name}'"))),
        }
    }

    fn seq_like(&mut self, sequence: bool) -> Result<TypeNode, SyntaxError> {
        let mut size = None;
        if matches!(self.peek(), Some(Tok::LParen)) {
            size = Some(self.capture_balanced(Tok::LParen, Tok::RParen)?);
        } else if self.eat_keyword("SIZE") {
            let inner = self.capture_balanced(Tok::LParen, Tok::RParen)?;
            size = Some(format!("( SIZE {inner} )"));
        }

        if size.is_some() || self.eat_keyword("OF") {
            if size.is_some() {
                self.expect_keyword("OF")?;
            }
            let element = Box::new(self.ty()?);
            return Ok(if sequence {
                TypeNode::SequenceOf { size, element }
            } else {
                TypeNode::SetOf { size, element }
            });
        }

        let (components, extensible) = self.component_list()?;
        Ok(if sequence {
            TypeNode::Sequence {
                components,
                extensible,
            }
        } else {
            TypeNode::Set {
                components,
                extensible,
            }
        })
    }

    fn component_list(&mut self) -> Result<(Vec<Component>, bool), SyntaxError> {
        self.expect(&Tok::LBrace, "'{'")?;
        let mut components = Vec::new();
        let mut extensible = false;
        if self.eat(&Tok::RBrace) {
            return Ok((components, extensible));
        }
        loop {
            if self.eat(&Tok::Ellipsis) {
                extensible = true;
            } else {
                let name = self.ident("a component name")?;
                let ty = self.ty()?;
                let optional = self.eat_keyword("OPTIONAL");
                let default = if self.eat_keyword("DEFAULT") {
                    Some(self.value()?)
                } else {
                    None
                };
                components.push(Component {
                    name,
                    ty,
                    optional,
                    default,
                });
            }
            if self.eat(&Tok::Comma) {
                continue;
            }
            self.expect(&Tok::RBrace, "',' or '}'")?;
            break;
        }
        Ok((components, extensible))
    }

    fn named_number_list(&mut self) -> Result<(Vec<NamedNumber>, bool), SyntaxError> {
        self.expect(&Tok::LBrace, "'{'")?;
        let mut items = Vec::new();
        let mut extensible = false;
        if self.eat(&Tok::RBrace) {
            return Ok((items, extensible));
        }
        loop {
            if self.eat(&Tok::Ellipsis) {
                extensible = true;
            } else {
                let name = self.ident("a name")?;
                let value = if self.eat(&Tok::LParen) {
                    let value = self.number("a number")?;
                    self.expect(&Tok::RParen, "')'")?;
                    Some(value)
                } else {
                    None
                };
                items.push(NamedNumber { name, value });
            }
            if self.eat(&Tok::Comma) {
                continue;
            }
            self.expect(&Tok::RBrace, "',' or '}'")?;
            break;
        }
        Ok((items, extensible))
    }

    fn value(&mut self) -> Result<String, SyntaxError> {
        if matches!(self.peek(), Some(Tok::LBrace)) {
            return self.capture_balanced(Tok::LBrace, Tok::RBrace);
        }
        match self.bump() {
            Some((tok, _)) => Ok(tok.to_string()),
            None => Err(self.error("expected a value")),
        }
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|ch| ch.is_ascii_uppercase())
}

impl fmt::Display for NamedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{}({})", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.ty)?;
        if self.optional {
            write!(f, " OPTIONAL")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Boolean => write!(f, "BOOLEAN"),
            TypeNode::Null => write!(f, "NULL"),
            TypeNode::Real => write!(f, "REAL"),
            TypeNode::Integer { named_numbers } => {
                write!(f, "INTEGER")?;
                if !named_numbers.is_empty() {
                    let items: Vec<String> =
                        named_numbers.iter().map(ToString::to_string).collect();
                    write!(f, " {{ {} }}", items.join(", "))?;
                }
                Ok(())
            }
            TypeNode::Enumerated { items, extensible } => {
                let mut parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                if *extensible {
                    parts.push("...".to_string());
                }
                write!(f, "ENUMERATED {{ {} }}", parts.join(", "))
            }
            TypeNode::BitString => write!(f, "BIT STRING"),
            TypeNode::OctetString => write!(f, "OCTET STRING"),
            TypeNode::ObjectIdentifier => write!(f, "OBJECT IDENTIFIER"),
            TypeNode::CharacterString { kind } => write!(f, "{kind}"),
            TypeNode::Sequence {
                components,
                extensible,
            } => fmt_components(f, "SEQUENCE", components, *extensible),
            TypeNode::Set {
                components,
                extensible,
            } => fmt_components(f, "SET", components, *extensible),
            TypeNode::SequenceOf { size, element } => match size {
                Some(size) => write!(f, "SEQUENCE {size} OF {element}"),
                None => write!(f, "SEQUENCE OF {element}"),
            },
            TypeNode::SetOf { size, element } => match size {
                Some(size) => write!(f, "SET {size} OF {element}"),
                None => write!(f, "SET OF {element}"),
            },
            TypeNode::Choice {
                alternatives,
                extensible,
            } => fmt_components(f, "CHOICE", alternatives, *extensible),
            TypeNode::Tagged {
                class,
                number,
                mode,
                inner,
            } => {
                match class {
                    Some(class) => write!(f, "[{class} {number}]")?,
                    None => write!(f, "[{number}]")?,
                }
                if let Some(mode) = mode {
                    write!(f, " {mode}")?;
                }
                write!(f, " {inner}")
            }
            TypeNode::Constrained { constraint, base } => write!(f, "{base} {constraint}"),
            TypeNode::Reference { name } => write!(f, "{name}"),
        }
    }
}

fn fmt_components(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    components: &[Component],
    extensible: bool,
) -> fmt::Result {
    let mut parts: Vec<String> = components.iter().map(ToString::to_string).collect();
    if extensible {
        parts.push("...".to_string());
    }
    if parts.is_empty() {
        write!(f, "{keyword} {{}}")
    } else {
        write!(f, "{keyword} {{ {} }}", parts.join(", "))
    }
}
