//! Object shapes: property partitioning, key quoting and generic constructors.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;
use crate::instruction::StaticParameter;
use crate::model::{Constraint, Property, TypeId};
use crate::session::Session;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern"));

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// How a dialect spells one group of properties, e.g. `Record({ ` ... `})`.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub import: Option<&'static str>,
    pub open: &'static str,
    pub close: &'static str,
}

/// How a dialect combines the required and optional groups.
#[derive(Debug, Clone, Copy)]
pub struct AllOf {
    pub import: Option<&'static str>,
    pub open: &'static str,
    pub separator: &'static str,
    pub close: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectSyntax {
    /// Module the imports above come from.
    pub module: &'static str,
    pub required: Group,
    pub optional: Group,
    pub all_of: AllOf,
}

#[derive(Debug, Default)]
pub struct PropertyGroups<'p> {
    pub required: Vec<&'p Property>,
    pub optional: Vec<&'p Property>,
}

// ————————————————————————————————————————————————————————————————————————————
// PURE HELPERS
// ————————————————————————————————————————————————————————————————————————————

pub fn partition(properties: &[Property]) -> PropertyGroups<'_> {
    let (optional, required): (Vec<&Property>, Vec<&Property>) = properties.iter().partition(|p| p.optional);
    PropertyGroups { required, optional }
}

pub fn requires_quotes(name: &str) -> bool {
    !IDENTIFIER.is_match(name)
}

/// Escape a name for use inside a template literal.
pub fn escape_quoted(name: &str) -> String {
    name.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// `foo: ` or `` [`has spaces`]: ``.
pub fn property_key(name: &str) -> String {
    if requires_quotes(name) {
        format!("[`{}`]: ", escape_quoted(name))
    } else {
        format!("{name}: ")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EMISSION
// ————————————————————————————————————————————————————————————————————————————

impl Session<'_> {
    /// Required and optional properties of `id`, combined per `syntax`.
    pub fn write_object(&mut self, id: TypeId, syntax: &ObjectSyntax) -> Result<(), Error> {
        let node = self.node(id)?;
        let parameters: Vec<&str> = node.type_parameters.iter().map(|g| g.name.as_str()).collect();
        let groups = partition(&node.properties);

        match (groups.required.is_empty(), groups.optional.is_empty()) {
            (false, false) => {
                if let Some(name) = syntax.all_of.import {
                    self.out().import(syntax.module, name);
                }
                self.out().write(syntax.all_of.open);
                self.write_group(syntax.module, &syntax.required, &groups.required, &parameters)?;
                self.out().write(syntax.all_of.separator);
                self.write_group(syntax.module, &syntax.optional, &groups.optional, &parameters)?;
                self.out().write(syntax.all_of.close);
            }
            (true, false) => {
                self.write_group(syntax.module, &syntax.optional, &groups.optional, &parameters)?;
            }
            _ => {
                self.write_group(syntax.module, &syntax.required, &groups.required, &parameters)?;
            }
        }
        Ok(())
    }

    fn write_group(
        &mut self,
        module: &str,
        group: &Group,
        properties: &[&Property],
        parameters: &[&str],
    ) -> Result<(), Error> {
        if let Some(name) = group.import {
            self.out().import(module, name);
        }
        self.out().write(group.open);
        for property in properties {
            self.out().write(property_key(&property.name));
            self.write_property_value(property.ty, parameters)?;
            self.out().write(", ");
        }
        self.out().write(group.close);
        Ok(())
    }

    /// A property typed by one of the enclosing type parameters is bound at
    /// the call site, so only its name is written.
    fn write_property_value(&mut self, ty: TypeId, parameters: &[&str]) -> Result<(), Error> {
        let node = self.node(ty)?;
        if parameters.contains(&node.text.as_str()) {
            self.out().write(node.text.clone());
            Ok(())
        } else {
            self.generate_or_reuse(ty)
        }
    }

    /// `<T extends C, >(T: Base<T>, ) => body` plus the matching static type.
    pub fn object_function(&mut self, id: TypeId, base: &str, static_helper: &str) -> Result<(), Error> {
        let node = self.node(id)?;
        let name = self.type_name(id)?;
        let generics = &node.type_parameters;

        self.out().write("<");
        for generic in generics {
            self.out().write(format!("{} extends ", generic.name));
            match &generic.constraint {
                Some(Constraint { declared: Some(declared), .. }) => {
                    self.out().write(format!("{static_helper}<typeof "));
                    self.generate_or_reuse(*declared)?;
                    self.out().write(">");
                }
                Some(Constraint { text, .. }) => self.out().write(text.clone()),
                None => self.out().write("any"),
            }
            self.out().write(", ");
        }
        self.out().write(">(");
        for generic in generics {
            self.out().write(format!("{0}: {base}<{0}>, ", generic.name));
        }
        self.out().write(") => ");

        let dialect = self.dialect();
        dialect.object(self, id)?;

        let parameters = generics
            .iter()
            .map(|generic| {
                let constraint = match &generic.constraint {
                    Some(Constraint { declared: Some(declared), .. }) => Some(self.type_name(*declared)?.to_string()),
                    Some(Constraint { text, .. }) => Some(text.clone()),
                    None => None,
                };
                Ok(StaticParameter { name: generic.name.clone(), constraint })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        self.out().static_parameters(parameters);

        let names = generics.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", ");
        self.out()
            .static_type(format!("{static_helper}<ReturnType<typeof {name}<{names}>>>"));
        Ok(())
    }
}

// ------------------------------- Tests ------------------------------------ //
