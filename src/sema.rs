use std::collections::BTreeSet;
use std::fmt;

use crate::error::SemanticError;
use crate::parse::{AssignmentNode, ModuleNode, ParseTree, TypeNode};

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub tag_default: Option<String>,
    pub imports: Vec<String>,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Type(TypeDecl),
    Value(ValueDecl),
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub ty: TypeNode,
}

#[derive(Debug, Clone)]
pub struct ValueDecl {
    pub name: String,
    pub ty: TypeNode,
    pub value: String,
}

/// Builds the ordered module sequence from a parse tree. Modules come out in
/// the order they appear in the source file, declarations in declaration
/// order within each module.
pub fn build_semantic_model(tree: &ParseTree) -> Result<Vec<Module>, SemanticError> {
    tree.modules.iter().map(build_module).collect()
}

fn build_module(node: &ModuleNode) -> Result<Module, SemanticError> {
    let imports: Vec<String> = node
        .imports
        .iter()
        .flat_map(|import| import.symbols.iter().cloned())
        .collect();

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for assignment in &node.assignments {
        let name = assignment_name(assignment);
        if !seen.insert(name) {
            return Err(SemanticError(format!(
                "{name} is defined more than once in module {}",
                node.name
            )));
        }
    }

    let mut scope: BTreeSet<&str> = seen;
    for symbol in &imports {
        scope.insert(symbol.as_str());
    }

    let mut decls = Vec::new();
    for assignment in &node.assignments {
        match assignment {
            AssignmentNode::Type { name, ty } => {
                check_references(ty, &scope, &node.name, name)?;
                decls.push(Decl::Type(TypeDecl {
                    name: name.clone(),
                    ty: ty.clone(),
                }));
            }
            AssignmentNode::Value { name, ty, value } => {
                check_references(ty, &scope, &node.name, name)?;
                decls.push(Decl::Value(ValueDecl {
                    name: name.clone(),
                    ty: ty.clone(),
                    value: value.clone(),
                }));
            }
        }
    }

    Ok(Module {
        name: node.name.clone(),
        tag_default: node.tag_default.clone(),
        imports,
        decls,
    })
}

fn assignment_name(assignment: &AssignmentNode) -> &str {
    match assignment {
        AssignmentNode::Type { name, .. } => name,
        AssignmentNode::Value { name, .. } => name,
    }
}

fn check_references(
    ty: &TypeNode,
    scope: &BTreeSet<&str>,
    module: &str,
    owner: &str,
) -> Result<(), SemanticError> {
    match ty {
        TypeNode::Reference { name } => {
            if scope.contains(name.as_str()) {
                Ok(())
            } else {
                Err(SemanticError(format!(
                    "unresolved type reference {name} in {module}.{owner}"
                )))
            }
        }
        TypeNode::Sequence { components, .. } | TypeNode::Set { components, .. } => {
            for component in components {
                check_references(&component.ty, scope, module, owner)?;
            }
            Ok(())
        }
        TypeNode::Choice { alternatives, .. } => {
            for alternative in alternatives {
                check_references(&alternative.ty, scope, module, owner)?;
            }
            Ok(())
        }
        TypeNode::SequenceOf { element, .. } | TypeNode::SetOf { element, .. } => {
            check_references(element, scope, module, owner)
        }
        TypeNode::Tagged { inner, .. } => check_references(inner, scope, module, owner),
        TypeNode::Constrained { base, .. } => check_references(base, scope, module, owner),
        _ => Ok(()),
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag_default {
            Some(mode) => writeln!(f, "{} DEFINITIONS {mode} TAGS ::= BEGIN", self.name)?,
            None => writeln!(f, "{} DEFINITIONS ::= BEGIN", self.name)?,
        }
        for decl in &self.decls {
            match decl {
                Decl::Type(decl) => writeln!(f, "    {} ::= {}", decl.name, decl.ty)?,
                Decl::Value(decl) => {
                    writeln!(f, "    {} {} ::= {}", decl.name, decl.ty, decl.value)?
                }
            }
        }
        write!(f, "END")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_asn1;

    fn model(text: &str) -> Result<Vec<Module>, SemanticError> {
        build_semantic_model(&parse_asn1(text).unwrap())
    }

    #[test]
    fn preserves_declaration_order() {
        let modules = model(
            "M DEFINITIONS ::= BEGIN
                Zebra ::= BOOLEAN
                Apple ::= INTEGER
                Mango ::= UTF8String
            END",
        )
        .unwrap();
        let names: Vec<&str> = modules[0]
            .decls
            .iter()
            .map(|decl| match decl {
                Decl::Type(decl) => decl.name.as_str(),
                Decl::Value(decl) => decl.name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn preserves_module_order() {
        let modules = model(
            "Second DEFINITIONS ::= BEGIN T ::= BOOLEAN END
             First DEFINITIONS ::= BEGIN U ::= BOOLEAN END",
        )
        .unwrap();
        assert_eq!(modules[0].name, "Second");
        assert_eq!(modules[1].name, "First");
    }

    #[test]
    fn rejects_duplicate_definition() {
        let err = model(
            "M DEFINITIONS ::= BEGIN
                T ::= BOOLEAN
                T ::= INTEGER
            END",
        )
        .unwrap_err();
        assert!(err.0.contains("defined more than once"), "{}", err.0);
    }

    #[test]
    fn rejects_unresolved_reference() {
        let err = model(
            "M DEFINITIONS ::= BEGIN
                Entry ::= SEQUENCE { who Person }
            END",
        )
        .unwrap_err();
        assert!(err.0.contains("unresolved type reference Person"), "{}", err.0);
    }

    #[test]
    fn resolves_local_and_imported_references() {
        let modules = model(
            "M DEFINITIONS ::= BEGIN
                IMPORTS Address FROM Directory;
                Person ::= SEQUENCE { home Address }
                People ::= SEQUENCE OF Person
            END",
        )
        .unwrap();
        assert_eq!(modules[0].imports, vec!["Address"]);
        assert_eq!(modules[0].decls.len(), 2);
    }

    #[test]
    fn resolves_references_inside_choice_and_tags() {
        let modules = model(
            "M DEFINITIONS IMPLICIT TAGS ::= BEGIN
                Id ::= INTEGER
                Key ::= CHOICE { numeric [0] Id, text [1] UTF8String }
            END",
        )
        .unwrap();
        assert_eq!(modules[0].tag_default.as_deref(), Some("IMPLICIT"));
    }

    #[test]
    fn display_renders_asn1_notation() {
        let modules = model(
            "M DEFINITIONS ::= BEGIN
                Point ::= SEQUENCE { x INTEGER, y INTEGER }
                max-size INTEGER ::= 8
            END",
        )
        .unwrap();
        let rendered = modules[0].to_string();
        assert!(rendered.starts_with("M DEFINITIONS ::= BEGIN"));
        assert!(rendered.contains("Point ::= SEQUENCE { x INTEGER, y INTEGER }"));
        assert!(rendered.contains("max-size INTEGER ::= 8"));
        assert!(rendered.ends_with("END"));
    }
}
