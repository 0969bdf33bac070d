use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::parse::{self, TypeNode};
use crate::sema::{self, Decl, Module, TypeDecl, ValueDecl};

pub struct GenerateOptions<'a> {
    pub input: &'a Path,
    pub split: bool,
    pub include_asn1: bool,
}

/// Generates Rust type definitions for every module in the input file. The
/// generator owns the full pipeline: it re-reads and re-parses the input at
/// the given path, which is why callers must hand it an absolute path when
/// the working directory has been redirected at an output directory.
pub fn generate(options: &GenerateOptions<'_>) -> Result<()> {
    let source = fs::read_to_string(options.input)
        .with_context(|| format!("failed to read {}", options.input.display()))?;
    let tree = parse::parse_asn1(&source)?;
    let modules = sema::build_semantic_model(&tree)?;

    let header = header(options.input);
    for module in &modules {
        let code = render_module(module, options.include_asn1, &header)?;
        if options.split {
            let file_name = format!("{}.rs", rust_module_name(&module.name));
            fs::write(&file_name, &code)
                .with_context(|| format!("failed to write {file_name}"))?;
        } else {
            print!("{code}");
        }
    }

    Ok(())
}

fn header(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let mut header = format!(
        "// Generated by asn1gen {} from {name}\n",
        env!("CARGO_PKG_VERSION")
    );
    if let Some(modified) = modified_rfc3339(input) {
        header.push_str(&format!("// Source last modified {modified}\n"));
    }
    header
}

fn modified_rfc3339(input: &Path) -> Option<String> {
    let modified = fs::metadata(input).ok()?.modified().ok()?;
    OffsetDateTime::from(modified).format(&Rfc3339).ok()
}

pub fn render_module(module: &Module, include_asn1: bool, header: &str) -> Result<String> {
    let mut out = String::new();
    out.push_str(header);
    out.push_str(&format!("// ASN.1 module: {}\n\n", module.name));

    for decl in &module.decls {
        if include_asn1 {
            match decl {
                Decl::Type(decl) => {
                    out.push_str(&format!("// {} ::= {}\n", decl.name, decl.ty));
                }
                Decl::Value(decl) => {
                    out.push_str(&format!("// {} {} ::= {}\n", decl.name, decl.ty, decl.value));
                }
            }
        }
        match decl {
            Decl::Type(decl) => out.push_str(&render_type_decl(decl)?),
            Decl::Value(decl) => out.push_str(&render_value_decl(decl)),
        }
        out.push('\n');
    }

    Ok(out)
}

fn render_type_decl(decl: &TypeDecl) -> Result<String> {
    let mut items = Vec::new();
    render_item(&rust_type_name(&decl.name), &decl.ty, &mut items)?;
    Ok(items.join("\n"))
}

fn render_item(name: &str, ty: &TypeNode, items: &mut Vec<String>) -> Result<()> {
    match strip(ty) {
        TypeNode::Sequence { components, .. } | TypeNode::Set { components, .. } => {
            let mut fields = Vec::new();
            let mut hoisted = Vec::new();
            for component in components {
                let field_ty = field_type(name, &component.name, &component.ty, &mut hoisted)?;
                let field_ty = if component.optional || component.default.is_some() {
                    format!("Option<{field_ty}>")
                } else {
                    field_ty
                };
                let mut line = format!("    pub {}: {field_ty},", rust_field_name(&component.name));
                if let Some(default) = &component.default {
                    line.push_str(&format!(" // DEFAULT {default}"));
                }
                fields.push(line);
            }
            let mut item = String::from("#[derive(Debug, Clone, PartialEq)]\n");
            if fields.is_empty() {
                item.push_str(&format!("pub struct {name} {{}}\n"));
            } else {
                item.push_str(&format!("pub struct {name} {{\n{}\n}}\n", fields.join("\n")));
            }
            items.push(item);
            items.extend(hoisted);
        }
        TypeNode::Choice { alternatives, .. } => {
            let mut variants = Vec::new();
            let mut hoisted = Vec::new();
            for alternative in alternatives {
                let variant_ty =
                    field_type(name, &alternative.name, &alternative.ty, &mut hoisted)?;
                variants.push(format!(
                    "    {}({variant_ty}),",
                    rust_type_name(&alternative.name)
                ));
            }
            let item = format!(
                "#[derive(Debug, Clone, PartialEq)]\npub enum {name} {{\n{}\n}}\n",
                variants.join("\n")
            );
            items.push(item);
            items.extend(hoisted);
        }
        TypeNode::Enumerated {
            items: enumerated, ..
        } => {
            // Explicit numbers claim their discriminants first; implicit
            // items then take the smallest number still free, so an earlier
            // explicit value never collides with a later implicit one.
            let mut used = BTreeSet::new();
            for item in enumerated {
                if let Some(value) = item.value {
                    if !used.insert(value) {
                        bail!("duplicate ENUMERATED value {value} in {name}");
                    }
                }
            }
            let mut variants = Vec::new();
            let mut next = 0i64;
            for item in enumerated {
                let value = match item.value {
                    Some(value) => value,
                    None => {
                        while !used.insert(next) {
                            next += 1;
                        }
                        next
                    }
                };
                variants.push(format!("    {} = {value},", rust_type_name(&item.name)));
            }
            let item = format!(
                "#[derive(Debug, Clone, Copy, PartialEq, Eq)]\npub enum {name} {{\n{}\n}}\n",
                variants.join("\n")
            );
            items.push(item);
        }
        TypeNode::Integer { named_numbers } if !named_numbers.is_empty() => {
            let mut item = format!("pub type {name} = i64;\n");
            for named in named_numbers {
                if let Some(value) = named.value {
                    item.push_str(&format!(
                        "pub const {}_{}: {name} = {value};\n",
                        rust_const_name(name),
                        rust_const_name(&named.name)
                    ));
                }
            }
            items.push(item);
        }
        other => {
            let mut hoisted = Vec::new();
            let expr = field_type(name, "item", other, &mut hoisted)?;
            items.push(format!("pub type {name} = {expr};\n"));
            items.extend(hoisted);
        }
    }
    Ok(())
}

fn field_type(
    owner: &str,
    field: &str,
    ty: &TypeNode,
    hoisted: &mut Vec<String>,
) -> Result<String> {
    let ty = strip(ty);
    Ok(match ty {
        TypeNode::Boolean => "bool".to_string(),
        TypeNode::Null => "()".to_string(),
        TypeNode::Real => "f64".to_string(),
        TypeNode::Integer { .. } => "i64".to_string(),
        TypeNode::BitString => "Vec<bool>".to_string(),
        TypeNode::OctetString => "Vec<u8>".to_string(),
        TypeNode::ObjectIdentifier => "Vec<u64>".to_string(),
        TypeNode::CharacterString { .. } => "String".to_string(),
        TypeNode::SequenceOf { element, .. } | TypeNode::SetOf { element, .. } => {
            format!("Vec<{}>", field_type(owner, field, element, hoisted)?)
        }
        TypeNode::Reference { name } => rust_type_name(name),
        TypeNode::Sequence { .. }
        | TypeNode::Set { .. }
        | TypeNode::Choice { .. }
        | TypeNode::Enumerated { .. } => {
            let synthesized = format!("{owner}{}", rust_type_name(field));
            render_item(&synthesized, ty, hoisted)?;
            synthesized
        }
        // strip() removed these
        TypeNode::Tagged { .. } | TypeNode::Constrained { .. } => unreachable!(),
    })
}

/// Tags and subtype constraints do not change the Rust shape of a type.
fn strip(ty: &TypeNode) -> &TypeNode {
    match ty {
        TypeNode::Tagged { inner, .. } => strip(inner),
        TypeNode::Constrained { base, .. } => strip(base),
        other => other,
    }
}

fn render_value_decl(decl: &ValueDecl) -> String {
    let name = rust_const_name(&decl.name);
    if let Ok(value) = decl.value.parse::<i64>() {
        return format!("pub const {name}: i64 = {value};\n");
    }
    match decl.value.as_str() {
        "TRUE" => format!("pub const {name}: bool = true;\n"),
        "FALSE" => format!("pub const {name}: bool = false;\n"),
        _ => format!(
            "// value assignment {} omitted (unsupported value notation)\n",
            decl.name
        ),
    }
}

pub fn rust_type_name(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect()
}

fn capitalize_first(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn rust_field_name(name: &str) -> String {
    escape_keyword(to_snake(name))
}

pub fn rust_module_name(name: &str) -> String {
    to_snake(name)
}

pub fn rust_const_name(name: &str) -> String {
    to_snake(name).to_ascii_uppercase()
}

fn to_snake(name: &str) -> String {
    let mut out = String::new();
    for ch in name.chars() {
        if ch == '-' {
            out.push('_');
        } else if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "union", "unsafe",
    "use", "where", "while",
];

fn escape_keyword(name: String) -> String {
    match name.as_str() {
        "self" | "super" | "crate" => format!("{name}_"),
        _ if RUST_KEYWORDS.contains(&name.as_str()) => format!("r#{name}"),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_asn1;
    use crate::sema::build_semantic_model;

    fn render(text: &str) -> String {
        let modules = build_semantic_model(&parse_asn1(text).unwrap()).unwrap();
        render_module(&modules[0], false, "").unwrap()
    }

    #[test]
    fn sequence_becomes_struct_with_options() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Point ::= SEQUENCE {
                    x INTEGER,
                    label UTF8String OPTIONAL,
                    scale INTEGER DEFAULT 1
                }
            END",
        );
        assert!(code.contains("pub struct Point {"));
        assert!(code.contains("    pub x: i64,"));
        assert!(code.contains("    pub label: Option<String>,"));
        assert!(code.contains("    pub scale: Option<i64>, // DEFAULT 1"));
    }

    #[test]
    fn choice_becomes_enum() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Key ::= CHOICE { numeric INTEGER, text UTF8String }
            END",
        );
        assert!(code.contains("pub enum Key {"));
        assert!(code.contains("    Numeric(i64),"));
        assert!(code.contains("    Text(String),"));
    }

    #[test]
    fn enumerated_keeps_discriminants() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Color ::= ENUMERATED { red(0), green, blue(5) }
            END",
        );
        assert!(code.contains("    Red = 0,"));
        assert!(code.contains("    Green = 1,"));
        assert!(code.contains("    Blue = 5,"));
    }

    #[test]
    fn implicit_discriminants_skip_explicit_values() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Mode ::= ENUMERATED { alpha(1), beta(0), gamma }
            END",
        );
        assert!(code.contains("    Alpha = 1,"));
        assert!(code.contains("    Beta = 0,"));
        assert!(code.contains("    Gamma = 2,"));
    }

    #[test]
    fn duplicate_enumerated_values_are_rejected() {
        let modules = build_semantic_model(
            &parse_asn1(
                "M DEFINITIONS ::= BEGIN
                    Mode ::= ENUMERATED { alpha(1), beta(1) }
                END",
            )
            .unwrap(),
        )
        .unwrap();
        let err = render_module(&modules[0], false, "").unwrap_err();
        assert!(err.to_string().contains("duplicate ENUMERATED value 1"));
    }

    #[test]
    fn aliases_and_collections() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Name ::= UTF8String
                Blob ::= OCTET STRING
                Names ::= SEQUENCE SIZE (1..8) OF Name
            END",
        );
        assert!(code.contains("pub type Name = String;"));
        assert!(code.contains("pub type Blob = Vec<u8>;"));
        assert!(code.contains("pub type Names = Vec<Name>;"));
    }

    #[test]
    fn inline_structured_types_are_hoisted() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Person ::= SEQUENCE {
                    home SEQUENCE { street UTF8String, number INTEGER }
                }
            END",
        );
        assert!(code.contains("pub struct Person {"));
        assert!(code.contains("    pub home: PersonHome,"));
        assert!(code.contains("pub struct PersonHome {"));
        assert!(code.contains("    pub street: String,"));
    }

    #[test]
    fn tags_and_constraints_do_not_change_shape() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Age ::= [0] IMPLICIT INTEGER (0..150)
            END",
        );
        assert!(code.contains("pub type Age = i64;"));
    }

    #[test]
    fn named_numbers_become_consts() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Version ::= INTEGER { v1(0), v2(1) }
            END",
        );
        assert!(code.contains("pub type Version = i64;"));
        assert!(code.contains("pub const VERSION_V1: Version = 0;"));
        assert!(code.contains("pub const VERSION_V2: Version = 1;"));
    }

    #[test]
    fn value_assignments_become_consts() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                max-entries INTEGER ::= 42
                strict-mode BOOLEAN ::= TRUE
            END",
        );
        assert!(code.contains("pub const MAX_ENTRIES: i64 = 42;"));
        assert!(code.contains("pub const STRICT_MODE: bool = true;"));
    }

    #[test]
    fn include_asn1_embeds_source_notation() {
        let modules = build_semantic_model(
            &parse_asn1(
                "M DEFINITIONS ::= BEGIN
                    Point ::= SEQUENCE { x INTEGER, y INTEGER }
                END",
            )
            .unwrap(),
        )
        .unwrap();
        let code = render_module(&modules[0], true, "").unwrap();
        assert!(code.contains("// Point ::= SEQUENCE { x INTEGER, y INTEGER }"));
    }

    #[test]
    fn keyword_fields_are_escaped() {
        let code = render(
            "M DEFINITIONS ::= BEGIN
                Entry ::= SEQUENCE { type UTF8String, loop-count INTEGER }
            END",
        );
        assert!(code.contains("    pub r#type: String,"));
        assert!(code.contains("    pub loop_count: i64,"));
    }

    #[test]
    fn name_conversions() {
        assert_eq!(rust_type_name("Point-Of-Sale"), "PointOfSale");
        assert_eq!(rust_field_name("subjectPublicKey"), "subject_public_key");
        assert_eq!(rust_module_name("PointModule"), "point_module");
        assert_eq!(rust_const_name("max-entries"), "MAX_ENTRIES");
    }
}
