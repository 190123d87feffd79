//! The closed set of type kinds

use std::fmt;

use serde::Serialize;

/// Kind of a type, mirroring the runtime reflection kinds of the source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Ptr,
    Array,
    Slice,
    Map,
    Struct,
    Interface,
}

impl Kind {
    /// Every kind, in declaration order
    pub const ALL: [Kind; 22] = [
        Kind::Bool,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Float32,
        Kind::Float64,
        Kind::Complex64,
        Kind::Complex128,
        Kind::String,
        Kind::Ptr,
        Kind::Array,
        Kind::Slice,
        Kind::Map,
        Kind::Struct,
        Kind::Interface,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::String => "string",
            Kind::Ptr => "ptr",
            Kind::Array => "array",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Interface => "interface",
        }
    }

    /// Check if this is a signed or unsigned integer kind
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Int
                | Kind::Int8
                | Kind::Int16
                | Kind::Int32
                | Kind::Int64
                | Kind::Uint
                | Kind::Uint8
                | Kind::Uint16
                | Kind::Uint32
                | Kind::Uint64
        )
    }

    /// Check if this is a floating-point kind
    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }

    /// Check if this is a complex kind
    pub fn is_complex(self) -> bool {
        matches!(self, Kind::Complex64 | Kind::Complex128)
    }

    /// Integer, float or complex
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    /// Built-in leaf kinds, as opposed to composite ones
    pub fn is_scalar(self) -> bool {
        self.is_numeric() || matches!(self, Kind::Bool | Kind::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let scalars: Vec<_> = Kind::ALL.iter().filter(|k| k.is_scalar()).collect();
        assert_eq!(scalars.len(), 16);
        assert!(Kind::Uint8.is_integer());
        assert!(Kind::Complex64.is_numeric());
        assert!(!Kind::Complex64.is_float());
        assert!(!Kind::Ptr.is_scalar());
    }

    #[test]
    fn test_names() {
        assert_eq!(Kind::Ptr.to_string(), "ptr");
        assert_eq!(Kind::Complex128.to_string(), "complex128");
        assert_eq!(serde_json::to_string(&Kind::Interface).unwrap(), "\"interface\"");
    }
}
