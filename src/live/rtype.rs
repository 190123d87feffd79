//! Runtime type handles for reflectable Rust types
//!
//! Rust has no built-in runtime reflection, so types opt in by implementing
//! [`Reflect`]. Element, key and field types are stored as function pointers
//! and evaluated on demand, which lets a struct refer to itself.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::mem::{align_of, size_of};

use num_complex::Complex;

use crate::types::Kind;

/// Lazily produces an [`RType`]
pub type RTypeFn = fn() -> RType;

/// A type that can describe itself at runtime
pub trait Reflect: 'static {
    fn rtype() -> RType;
}

/// Runtime description of one Rust type, in terms of the reflected kinds
#[derive(Debug, Clone, Copy)]
pub struct RType {
    id: TypeId,
    kind: Kind,
    name: &'static str,
    pkg: &'static str,
    size: usize,
    align: usize,
    shape: RShape,
}

/// Kind-specific contents of an [`RType`]
#[derive(Debug, Clone, Copy)]
pub enum RShape {
    Scalar,
    Ptr(RTypeFn),
    Array { elem: RTypeFn, len: usize },
    Slice(RTypeFn),
    Map { key: RTypeFn, elem: RTypeFn },
    Struct(&'static [FieldInfo]),
    /// Method names of the interface
    Interface(&'static [&'static str]),
}

/// A field of a reflected struct
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub ty: RTypeFn,
    pub tag: &'static str,
    pub offset: usize,
    pub embedded: bool,
}

impl FieldInfo {
    pub const fn new(name: &'static str, ty: RTypeFn, offset: usize) -> Self {
        Self { name, ty, tag: "", offset, embedded: false }
    }

    pub const fn tag(self, tag: &'static str) -> Self {
        Self { tag, ..self }
    }

    pub const fn embedded(self) -> Self {
        Self { embedded: true, ..self }
    }
}

impl RType {
    fn sized<T: 'static>(kind: Kind, name: &'static str, pkg: &'static str, shape: RShape) -> Self {
        Self {
            id: TypeId::of::<T>(),
            kind,
            name,
            pkg,
            size: size_of::<T>(),
            align: align_of::<T>(),
            shape,
        }
    }

    pub fn scalar<T: 'static>(kind: Kind, name: &'static str) -> Self {
        Self::sized::<T>(kind, name, "", RShape::Scalar)
    }

    pub fn pointer<T: 'static>(elem: RTypeFn) -> Self {
        Self::sized::<T>(Kind::Ptr, "", "", RShape::Ptr(elem))
    }

    pub fn array<T: 'static>(elem: RTypeFn, len: usize) -> Self {
        Self::sized::<T>(Kind::Array, "", "", RShape::Array { elem, len })
    }

    pub fn slice<T: 'static>(elem: RTypeFn) -> Self {
        Self::sized::<T>(Kind::Slice, "", "", RShape::Slice(elem))
    }

    pub fn map<T: 'static>(key: RTypeFn, elem: RTypeFn) -> Self {
        Self::sized::<T>(Kind::Map, "", "", RShape::Map { key, elem })
    }

    /// A named struct; `fields` must list the struct's fields in order
    pub fn structure<T: 'static>(
        name: &'static str,
        pkg: &'static str,
        fields: &'static [FieldInfo],
    ) -> Self {
        Self::sized::<T>(Kind::Struct, name, pkg, RShape::Struct(fields))
    }

    /// An interface backed by a trait object; stored like a boxed `T`
    pub fn interface<T: ?Sized + 'static>(name: &'static str, methods: &'static [&'static str]) -> Self {
        Self {
            id: TypeId::of::<T>(),
            kind: Kind::Interface,
            name,
            pkg: "",
            size: size_of::<Box<T>>(),
            align: align_of::<Box<T>>(),
            shape: RShape::Interface(methods),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pkg(&self) -> &'static str {
        self.pkg
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn shape(&self) -> &RShape {
        &self.shape
    }
}

macro_rules! reflect_scalar {
    ($($ty:ty => $kind:ident, $name:literal;)*) => {
        $(
            impl Reflect for $ty {
                fn rtype() -> RType {
                    RType::scalar::<$ty>(Kind::$kind, $name)
                }
            }
        )*
    };
}

reflect_scalar! {
    bool => Bool, "bool";
    isize => Int, "int";
    i8 => Int8, "int8";
    i16 => Int16, "int16";
    i32 => Int32, "int32";
    i64 => Int64, "int64";
    usize => Uint, "uint";
    u8 => Uint8, "uint8";
    u16 => Uint16, "uint16";
    u32 => Uint32, "uint32";
    u64 => Uint64, "uint64";
    f32 => Float32, "float32";
    f64 => Float64, "float64";
    Complex<f32> => Complex64, "complex64";
    Complex<f64> => Complex128, "complex128";
    String => String, "string";
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn rtype() -> RType {
        RType::pointer::<Self>(T::rtype)
    }
}

/// A nullable pointer
impl<T: Reflect + ?Sized> Reflect for Option<Box<T>> {
    fn rtype() -> RType {
        RType::pointer::<Self>(T::rtype)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn rtype() -> RType {
        RType::slice::<Self>(T::rtype)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn rtype() -> RType {
        RType::array::<Self>(T::rtype, N)
    }
}

impl<K: Reflect, V: Reflect> Reflect for HashMap<K, V> {
    fn rtype() -> RType {
        RType::map::<Self>(K::rtype, V::rtype)
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn rtype() -> RType {
        RType::map::<Self>(K::rtype, V::rtype)
    }
}

impl Reflect for dyn StdError + Send + Sync {
    fn rtype() -> RType {
        RType::interface::<Self>("error", &["Error"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_shapes() {
        let vec = <Vec<u8> as Reflect>::rtype();
        assert_eq!(vec.kind(), Kind::Slice);
        match vec.shape() {
            RShape::Slice(elem) => assert_eq!(elem().kind(), Kind::Uint8),
            other => panic!("unexpected shape {:?}", other),
        }

        let arr = <[i16; 4] as Reflect>::rtype();
        assert_eq!(arr.size(), 8);
        assert!(matches!(arr.shape(), RShape::Array { len: 4, .. }));

        let map = <HashMap<String, bool> as Reflect>::rtype();
        match map.shape() {
            RShape::Map { key, elem } => {
                assert_eq!(key().kind(), Kind::String);
                assert_eq!(elem().kind(), Kind::Bool);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_pointer_identities_differ() {
        let boxed = <Box<i64> as Reflect>::rtype();
        let nullable = <Option<Box<i64>> as Reflect>::rtype();
        assert_eq!(boxed.kind(), Kind::Ptr);
        assert_eq!(nullable.kind(), Kind::Ptr);
        assert_ne!(boxed.id(), nullable.id());
    }

    #[test]
    fn test_field_info_builders() {
        const FIELD: FieldInfo = FieldInfo::new("Base", <u32 as Reflect>::rtype, 8).tag("json:\"base\"").embedded();
        assert_eq!(FIELD.tag, "json:\"base\"");
        assert!(FIELD.embedded);
        assert_eq!(FIELD.offset, 8);
        assert_eq!((FIELD.ty)().name(), "uint32");
    }
}
