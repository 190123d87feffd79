//! [`Type`] over runtime type handles

use std::fmt;
use std::sync::Arc;

use crate::types::{member_pkg, Identity, Kind, Method, Origin, StructField, StructTag, Type, TypeRef};
use crate::utils::{Error, Result};

use super::rtype::{RShape, RType, RTypeFn, Reflect};

/// A type introspected from a live value. Every type this adapter hands out
/// is itself a `LiveType`.
#[derive(Clone, Copy)]
pub struct LiveType {
    rtype: RType,
}

/// The type of `value`, as a shared descriptor
pub fn type_of<T: Reflect + ?Sized>(value: &T) -> TypeRef {
    Arc::new(LiveType::of(value))
}

fn wrap(ty: RTypeFn) -> TypeRef {
    Arc::new(LiveType::from_rtype(ty()))
}

impl LiveType {
    pub fn of<T: Reflect + ?Sized>(_value: &T) -> Self {
        Self::of_type::<T>()
    }

    pub fn of_type<T: Reflect + ?Sized>() -> Self {
        Self { rtype: T::rtype() }
    }

    pub fn from_rtype(rtype: RType) -> Self {
        Self { rtype }
    }

    pub fn rtype(&self) -> &RType {
        &self.rtype
    }

    fn not_applicable(&self, method: &'static str) -> Error {
        Error::NotApplicable { method, kind: self.rtype.kind() }
    }

    fn methods(&self, method: &'static str) -> Result<&'static [&'static str]> {
        match self.rtype.shape() {
            RShape::Interface(methods) => Ok(*methods),
            _ => Err(Error::Unsupported { method, origin: Origin::Live }),
        }
    }

    fn method_at(&self, methods: &[&'static str], i: usize) -> Method {
        Method {
            name: methods[i].to_string(),
            pkg_path: member_pkg(methods[i], self.rtype.pkg()),
            index: i,
        }
    }
}

impl Type for LiveType {
    fn kind(&self) -> Kind {
        self.rtype.kind()
    }

    fn name(&self) -> &str {
        self.rtype.name()
    }

    fn pkg_path(&self) -> String {
        let (pkg, name) = (self.rtype.pkg(), self.rtype.name());
        if pkg.is_empty() || name.is_empty() {
            String::new()
        } else {
            format!("{}/{}", pkg, name)
        }
    }

    fn identity(&self) -> Identity {
        Identity::Live(self.rtype.id())
    }

    fn origin(&self) -> Origin {
        Origin::Live
    }

    fn size(&self) -> Result<usize> {
        Ok(self.rtype.size())
    }

    fn align(&self) -> Result<usize> {
        Ok(self.rtype.align())
    }

    fn field_align(&self) -> Result<usize> {
        Ok(self.rtype.align())
    }

    fn bits(&self) -> Result<usize> {
        if self.kind().is_numeric() {
            Ok(self.rtype.size() * 8)
        } else {
            Err(self.not_applicable("bits"))
        }
    }

    fn comparable(&self) -> Result<bool> {
        match self.rtype.shape() {
            RShape::Slice(_) | RShape::Map { .. } => Ok(false),
            RShape::Array { elem, .. } => wrap(*elem).comparable(),
            RShape::Struct(fields) => {
                for field in fields.iter() {
                    if !wrap(field.ty).comparable()? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RShape::Scalar | RShape::Ptr(_) | RShape::Interface(_) => Ok(true),
        }
    }

    fn assignable_to(&self, u: &dyn Type) -> Result<bool> {
        Ok(u.origin() == Origin::Live && self.identity() == u.identity())
    }

    fn convertible_to(&self, u: &dyn Type) -> Result<bool> {
        if u.origin() != Origin::Live {
            return Ok(false);
        }
        if self.identity() == u.identity() {
            return Ok(true);
        }
        let (from, to) = (self.kind(), u.kind());
        let real = |k: Kind| k.is_integer() || k.is_float();
        Ok((real(from) && real(to))
            || (from.is_complex() && to.is_complex())
            || (from == Kind::String && to == Kind::String))
    }

    fn implements(&self, u: &dyn Type) -> Result<bool> {
        let kind = u.kind();
        if kind != Kind::Interface {
            return Err(Error::NotApplicable { method: "implements", kind });
        }
        if u.origin() != Origin::Live {
            return Ok(false);
        }
        if self.identity() == u.identity() || u.num_method()? == 0 {
            return Ok(true);
        }
        Err(Error::Unsupported { method: "implements", origin: Origin::Live })
    }

    fn num_method(&self) -> Result<usize> {
        Ok(self.methods("num_method")?.len())
    }

    fn method(&self, i: usize) -> Result<Method> {
        let methods = self.methods("method")?;
        if i >= methods.len() {
            return Err(Error::IndexOutOfRange { index: i, count: methods.len() });
        }
        Ok(self.method_at(methods, i))
    }

    fn method_by_name(&self, name: &str) -> Result<Option<Method>> {
        let methods = self.methods("method_by_name")?;
        Ok(methods
            .iter()
            .position(|m| *m == name)
            .map(|i| self.method_at(methods, i)))
    }

    fn elem(&self) -> Result<TypeRef> {
        match self.rtype.shape() {
            RShape::Ptr(elem)
            | RShape::Slice(elem)
            | RShape::Array { elem, .. }
            | RShape::Map { elem, .. } => Ok(wrap(*elem)),
            _ => Err(self.not_applicable("elem")),
        }
    }

    fn key(&self) -> Result<TypeRef> {
        match self.rtype.shape() {
            RShape::Map { key, .. } => Ok(wrap(*key)),
            _ => Err(self.not_applicable("key")),
        }
    }

    fn len(&self) -> Result<usize> {
        match self.rtype.shape() {
            RShape::Array { len, .. } => Ok(*len),
            _ => Err(self.not_applicable("len")),
        }
    }

    fn num_field(&self) -> Result<usize> {
        match self.rtype.shape() {
            RShape::Struct(fields) => Ok(fields.len()),
            _ => Err(self.not_applicable("num_field")),
        }
    }

    fn field(&self, i: usize) -> Result<StructField> {
        let RShape::Struct(fields) = self.rtype.shape() else {
            return Err(self.not_applicable("field"));
        };
        let info = fields
            .get(i)
            .ok_or(Error::IndexOutOfRange { index: i, count: fields.len() })?;
        Ok(StructField {
            name: info.name.to_string(),
            pkg_path: member_pkg(info.name, self.rtype.pkg()),
            ty: wrap(info.ty),
            tag: StructTag::new(info.tag),
            offset: Some(info.offset),
            index: vec![i],
            anonymous: info.embedded,
        })
    }
}

impl fmt::Display for LiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rtype = &self.rtype;
        if !rtype.name().is_empty() {
            return if rtype.pkg().is_empty() {
                f.write_str(rtype.name())
            } else {
                write!(f, "{}.{}", rtype.pkg(), rtype.name())
            };
        }
        match rtype.shape() {
            RShape::Ptr(elem) => write!(f, "*{}", LiveType::from_rtype(elem())),
            RShape::Array { elem, len } => write!(f, "[{}]{}", len, LiveType::from_rtype(elem())),
            RShape::Slice(elem) => write!(f, "[]{}", LiveType::from_rtype(elem())),
            RShape::Map { key, elem } => write!(
                f,
                "map[{}]{}",
                LiveType::from_rtype(key()),
                LiveType::from_rtype(elem())
            ),
            RShape::Interface(_) => f.write_str("interface {}"),
            RShape::Scalar | RShape::Struct(_) => f.write_str(rtype.kind().as_str()),
        }
    }
}

impl fmt::Debug for LiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveType")
            .field("name", &self.rtype.name())
            .field("kind", &self.rtype.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::FieldInfo;
    use std::collections::HashMap;
    use std::mem::offset_of;
    use pretty_assertions::assert_eq;

    #[allow(dead_code)]
    struct Node {
        value: isize,
        next: Option<Box<Node>>,
        label: String,
    }

    impl Reflect for Node {
        fn rtype() -> RType {
            static FIELDS: &[FieldInfo] = &[
                FieldInfo::new("Value", <isize as Reflect>::rtype, offset_of!(Node, value))
                    .tag("json:\"value\""),
                FieldInfo::new("Next", <Option<Box<Node>> as Reflect>::rtype, offset_of!(Node, next)),
                FieldInfo::new("label", <String as Reflect>::rtype, offset_of!(Node, label)),
            ];
            RType::structure::<Self>("Node", "demo", FIELDS)
        }
    }

    #[allow(dead_code)]
    struct Tree {
        root: Node,
        index: HashMap<String, Vec<u8>>,
    }

    impl Reflect for Tree {
        fn rtype() -> RType {
            static FIELDS: &[FieldInfo] = &[
                FieldInfo::new("Node", <Node as Reflect>::rtype, offset_of!(Tree, root)).embedded(),
                FieldInfo::new("Index", <HashMap<String, Vec<u8>> as Reflect>::rtype, offset_of!(Tree, index)),
            ];
            RType::structure::<Self>("Tree", "demo", FIELDS)
        }
    }

    fn node() -> Node {
        Node { value: 1, next: None, label: String::new() }
    }

    #[test]
    fn test_struct_fields_carry_offsets() {
        let ty = type_of(&node());
        assert_eq!(ty.kind(), Kind::Struct);
        assert_eq!(ty.to_string(), "demo.Node");
        assert_eq!(ty.pkg_path(), "demo/Node");
        assert_eq!(ty.origin(), Origin::Live);
        assert_eq!(ty.num_field().unwrap(), 3);

        let value = ty.field(0).unwrap();
        assert_eq!(value.offset, Some(offset_of!(Node, value)));
        assert_eq!(value.tag.as_str(), "json:\"value\"");
        assert!(value.is_exported());

        let label = ty.field(2).unwrap();
        assert_eq!(label.pkg_path, "demo");
        assert_eq!(label.offset, Some(offset_of!(Node, label)));
    }

    #[test]
    fn test_self_reference_rewraps() {
        let ty = type_of(&node());
        let next = ty.field(1).unwrap().ty;
        assert_eq!(next.kind(), Kind::Ptr);
        assert_eq!(next.to_string(), "*demo.Node");
        assert_eq!(next.elem().unwrap().identity(), ty.identity());
    }

    #[test]
    fn test_promotion_through_live_embedding() {
        let ty = LiveType::of_type::<Tree>();
        let value = ty.field_by_name("Value").unwrap().unwrap();
        assert_eq!(value.index, vec![0, 0]);

        let index = ty.field(1).unwrap().ty;
        assert_eq!(index.to_string(), "map[string][]uint8");
        assert_eq!(index.key().unwrap().kind(), Kind::String);
        assert!(!index.comparable().unwrap());
        assert!(!ty.comparable().unwrap());
        assert!(type_of(&node()).comparable().unwrap());
    }

    #[test]
    fn test_layout_and_conversion() {
        let int = LiveType::of_type::<isize>();
        let float = LiveType::of_type::<f32>();
        let text = LiveType::of_type::<String>();
        assert_eq!(int.size().unwrap(), std::mem::size_of::<isize>());
        assert_eq!(float.bits().unwrap(), 32);
        assert!(matches!(text.bits(), Err(Error::NotApplicable { method: "bits", .. })));

        assert!(int.convertible_to(&float).unwrap());
        assert!(!int.convertible_to(&text).unwrap());
        assert!(int.assignable_to(&int).unwrap());
        assert!(!int.assignable_to(&float).unwrap());
        assert!(matches!(int.num_method(), Err(Error::Unsupported { origin: Origin::Live, .. })));
        assert!(matches!(int.num_in(), Err(Error::NotApplicable { method: "num_in", kind: Kind::Int })));
        assert!(matches!(text.num_out(), Err(Error::NotApplicable { method: "num_out", kind: Kind::String })));
    }

    #[test]
    fn test_interfaces() {
        let err = LiveType::of_type::<dyn std::error::Error + Send + Sync>();
        let int = LiveType::of_type::<isize>();
        assert_eq!(err.size().unwrap(), 2 * std::mem::size_of::<usize>());
        assert_eq!(err.method_by_name("Error").unwrap().unwrap().index, 0);
        assert!(err.method_by_name("String").unwrap().is_none());
        assert!(matches!(err.method(3), Err(Error::IndexOutOfRange { index: 3, count: 1 })));
        assert!(err.implements(&err).unwrap());
        assert!(matches!(int.implements(&err), Err(Error::Unsupported { .. })));
        assert!(matches!(int.implements(&int), Err(Error::NotApplicable { kind: Kind::Int, .. })));
    }

    #[test]
    fn test_unnamed_rendering() {
        assert_eq!(LiveType::of_type::<[Vec<bool>; 3]>().to_string(), "[3][]bool");
        assert_eq!(LiveType::of_type::<Box<f64>>().to_string(), "*float64");
        assert_eq!(LiveType::of_type::<isize>().pkg_path(), "");
    }
}
