//! Structure reports for printing a type in full
//!
//! A report expands element, key and field types recursively. A named
//! composite type is expanded the first time it is reached and appears as a
//! reference afterwards, so recursive types produce finite reports.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::types::{Identity, Kind, Type, TypeMap};
use crate::utils::Result;

/// Full structure of one type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeReport {
    pub kind: Kind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    pub rendered: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Box<TypeReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<TypeReport>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldReport>,
    /// Already expanded earlier in the same report
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reference: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReport {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(rename = "type")]
    pub ty: TypeReport,
}

/// One line of a type listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub rendered: String,
    pub kind: Kind,
}

impl fmt::Display for TypeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>20} := {:<30} {}", self.name, self.rendered, self.kind)
    }
}

/// Summaries of every type in `types`, in name order
pub fn summarize(types: &TypeMap) -> Vec<TypeSummary> {
    types
        .iter()
        .map(|(name, ty)| TypeSummary {
            name: name.clone(),
            rendered: ty.to_string(),
            kind: ty.kind(),
        })
        .collect()
}

/// Build the structure report of `ty`
pub fn describe(ty: &dyn Type) -> Result<TypeReport> {
    Describer::default().report(ty)
}

#[derive(Default)]
struct Describer {
    expanded: HashSet<Identity>,
}

impl Describer {
    fn report(&mut self, ty: &dyn Type) -> Result<TypeReport> {
        let kind = ty.kind();
        let mut report = TypeReport {
            kind,
            name: ty.name().to_string(),
            path: ty.pkg_path(),
            rendered: ty.to_string(),
            len: None,
            key: None,
            elem: None,
            fields: Vec::new(),
            reference: false,
        };
        if kind.is_scalar() {
            return Ok(report);
        }
        if !report.name.is_empty() && !self.expanded.insert(ty.identity()) {
            report.reference = true;
            return Ok(report);
        }

        match kind {
            Kind::Ptr | Kind::Slice => {
                report.elem = Some(Box::new(self.report(ty.elem()?.as_ref())?));
            }
            Kind::Array => {
                report.len = Some(ty.len()?);
                report.elem = Some(Box::new(self.report(ty.elem()?.as_ref())?));
            }
            Kind::Map => {
                report.key = Some(Box::new(self.report(ty.key()?.as_ref())?));
                report.elem = Some(Box::new(self.report(ty.elem()?.as_ref())?));
            }
            Kind::Struct => {
                for i in 0..ty.num_field()? {
                    let field = ty.field(i)?;
                    report.fields.push(FieldReport {
                        name: field.name,
                        tag: field.tag.as_str().to_string(),
                        anonymous: field.anonymous,
                        offset: field.offset,
                        ty: self.report(field.ty.as_ref())?,
                    });
                }
            }
            _ => {}
        }
        Ok(report)
    }
}

impl TypeReport {
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{} ({})", self.rendered, self.kind)?;
        if self.reference {
            f.write_str(" ...")?;
        }
        writeln!(f)?;

        let pad = "  ".repeat(depth + 1);
        if let Some(len) = self.len {
            writeln!(f, "{}len: {}", pad, len)?;
        }
        if let Some(key) = &self.key {
            write!(f, "{}key: ", pad)?;
            key.write_tree(f, depth + 1)?;
        }
        if let Some(elem) = &self.elem {
            write!(f, "{}elem: ", pad)?;
            elem.write_tree(f, depth + 1)?;
        }
        for field in &self.fields {
            write!(f, "{}{}", pad, field.name)?;
            if field.anonymous {
                f.write_str(" (embedded)")?;
            }
            if !field.tag.is_empty() {
                write!(f, " {}", field.tag)?;
            }
            if let Some(offset) = field.offset {
                write!(f, " @{}", offset)?;
            }
            f.write_str(": ")?;
            field.ty.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_str;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "package test
type Person struct {
    Name     string `json:\"name\"`
    Children []*Person
    Tags     map[string][2]int
}
";

    #[test]
    fn test_recursive_type_is_referenced() {
        let types = load_str(SOURCE).unwrap();
        let report = describe(types.get("Person").unwrap().as_ref()).unwrap();
        assert_eq!(report.kind, Kind::Struct);
        assert_eq!(report.path, "test/Person");
        assert_eq!(report.fields.len(), 3);

        let children = &report.fields[1].ty;
        let inner = children.elem.as_ref().unwrap().elem.as_ref().unwrap();
        assert_eq!(inner.rendered, "test.Person");
        assert!(inner.reference);
        assert!(inner.fields.is_empty());

        let tags = &report.fields[2].ty;
        assert_eq!(tags.key.as_ref().unwrap().kind, Kind::String);
        assert_eq!(tags.elem.as_ref().unwrap().len, Some(2));
    }

    #[test]
    fn test_text_tree() {
        let types = load_str(SOURCE).unwrap();
        let report = describe(types.get("Person").unwrap().as_ref()).unwrap();
        let expected = "\
test.Person (struct)
  Name `json:\"name\"`: string (string)
  Children: []*test.Person (slice)
    elem: *test.Person (ptr)
      elem: test.Person (struct) ...
  Tags: map[string][2]int (map)
    key: string (string)
    elem: [2]int (array)
      len: 2
      elem: int (int)
";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_json_and_summaries() {
        let types = load_str(SOURCE).unwrap();
        let report = describe(types.get("Person").unwrap().as_ref()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "struct");
        assert_eq!(json["fields"][0]["tag"], "`json:\"name\"`");
        assert_eq!(json["fields"][0]["type"]["kind"], "string");
        assert!(json.get("reference").is_none());

        let summaries = summarize(&types);
        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].to_string(),
            format!("{:>20} := {:<30} {}", "Person", "test.Person", "struct")
        );
    }
}
