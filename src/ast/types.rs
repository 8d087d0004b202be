//! Resolved static types as supplied by the front end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Predeclared basic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    #[serde(alias = "rune")]
    Int32,
    Int64,
    Uint,
    #[serde(alias = "byte")]
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    /// Booleans, numbers and raw pointers: values an atomic word can hold.
    pub fn is_primitive(self) -> bool {
        use BasicKind::*;
        matches!(
            self,
            Bool | Int
                | Int8
                | Int16
                | Int32
                | Int64
                | Uint
                | Uint8
                | Uint16
                | Uint32
                | Uint64
                | Uintptr
                | Float32
                | Float64
                | Complex64
                | Complex128
                | UnsafePointer
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, BasicKind::String | BasicKind::UntypedString)
    }

    fn name(self) -> &'static str {
        use BasicKind::*;
        match self {
            Bool => "bool",
            Int => "int",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            Uint => "uint",
            Uint8 => "uint8",
            Uint16 => "uint16",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Uintptr => "uintptr",
            Float32 => "float32",
            Float64 => "float64",
            Complex64 => "complex64",
            Complex128 => "complex128",
            String => "string",
            UnsafePointer => "unsafe.Pointer",
            UntypedBool => "untyped bool",
            UntypedInt => "untyped int",
            UntypedRune => "untyped rune",
            UntypedFloat => "untyped float",
            UntypedString => "untyped string",
            UntypedNil => "untyped nil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
}

/// A static type.
///
/// Named types carry their underlying type. Front ends cut recursive
/// definitions (a list node pointing at itself) with [`Type::Invalid`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Basic {
        name: BasicKind,
    },
    Named {
        /// Import path of the declaring package; `None` for universe types.
        #[serde(default)]
        package: Option<String>,
        name: String,
        #[serde(default = "invalid")]
        underlying: Box<Type>,
    },
    Pointer {
        elem: Box<Type>,
    },
    Slice {
        elem: Box<Type>,
    },
    Array {
        len: u64,
        elem: Box<Type>,
    },
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Chan {
        elem: Box<Type>,
    },
    Func,
    Interface {
        #[serde(default)]
        methods: Vec<String>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<StructField>,
    },
    Tuple {
        items: Vec<Type>,
    },
    Invalid,
}

fn invalid() -> Box<Type> {
    Box::new(Type::Invalid)
}

impl Type {
    pub fn basic(kind: BasicKind) -> Type {
        Type::Basic { name: kind }
    }

    pub fn int() -> Type {
        Type::basic(BasicKind::Int)
    }

    pub fn bool() -> Type {
        Type::basic(BasicKind::Bool)
    }

    pub fn string() -> Type {
        Type::basic(BasicKind::String)
    }

    pub fn byte() -> Type {
        Type::basic(BasicKind::Uint8)
    }

    pub fn rune() -> Type {
        Type::basic(BasicKind::Int32)
    }

    pub fn slice_of(elem: Type) -> Type {
        Type::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn array_of(len: u64, elem: Type) -> Type {
        Type::Array {
            len,
            elem: Box::new(elem),
        }
    }

    pub fn pointer_to(elem: Type) -> Type {
        Type::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn map_of(key: Type, value: Type) -> Type {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan_of(elem: Type) -> Type {
        Type::Chan {
            elem: Box::new(elem),
        }
    }

    pub fn named(package: Option<&str>, name: &str, underlying: Type) -> Type {
        Type::Named {
            package: package.map(str::to_string),
            name: name.to_string(),
            underlying: Box::new(underlying),
        }
    }

    pub fn struct_of(fields: &[(&str, Type)]) -> Type {
        Type::Struct {
            fields: fields
                .iter()
                .map(|(name, ty)| StructField {
                    name: (*name).to_string(),
                    ty: ty.clone(),
                })
                .collect(),
        }
    }

    pub fn empty_interface() -> Type {
        Type::Interface {
            methods: Vec::new(),
        }
    }

    /// The type with every named layer stripped.
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Named { underlying, .. } => underlying.underlying(),
            other => other,
        }
    }

    pub fn basic_kind(&self) -> Option<BasicKind> {
        match self.underlying() {
            Type::Basic { name } => Some(*name),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        self.basic_kind().is_some_and(BasicKind::is_string)
    }

    pub fn is_slice(&self) -> bool {
        matches!(self.underlying(), Type::Slice { .. })
    }

    /// Element type of a slice, looking through names.
    pub fn slice_elem(&self) -> Option<&Type> {
        match self.underlying() {
            Type::Slice { elem } => Some(elem),
            _ => None,
        }
    }

    /// Slices and arrays: ranging over them visits a known number of elements.
    pub fn is_indexable(&self) -> bool {
        matches!(self.underlying(), Type::Slice { .. } | Type::Array { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.underlying(), Type::Interface { .. })
    }

    /// Pointer element if this is a pointer, otherwise the type itself.
    pub fn deref(&self) -> &Type {
        match self {
            Type::Pointer { elem } => elem,
            other => other,
        }
    }

    /// True for `pkg.Name` (or a pointer to it) with `Name` in `names`.
    pub fn is_named_in(&self, pkg: &str, names: &[&str]) -> bool {
        match self.deref() {
            Type::Named {
                package: Some(package),
                name,
                ..
            } => package == pkg && names.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Declaring package of a named type (through one pointer).
    pub fn package(&self) -> Option<&str> {
        match self.deref() {
            Type::Named { package, .. } => package.as_deref(),
            _ => None,
        }
    }

    /// Values that already live behind a reference when boxed in an interface.
    pub fn is_pointer_like(&self) -> bool {
        match self.underlying() {
            Type::Pointer { .. }
            | Type::Interface { .. }
            | Type::Slice { .. }
            | Type::Map { .. }
            | Type::Chan { .. }
            | Type::Func => true,
            Type::Basic { name } => {
                matches!(name, BasicKind::UntypedNil | BasicKind::UnsafePointer)
            }
            _ => false,
        }
    }

    /// Boolean, numeric or pointer-sized value, or a pointer to one.
    pub fn is_primitive(&self) -> bool {
        match self.underlying() {
            Type::Basic { name } => name.is_primitive(),
            Type::Pointer { elem } => elem.basic_kind().is_some_and(BasicKind::is_primitive),
            _ => false,
        }
    }

    /// Aggregates, arrays and basic values: the shapes a literal can build.
    pub fn is_value_shape(&self) -> bool {
        matches!(
            self.underlying(),
            Type::Struct { .. } | Type::Array { .. } | Type::Basic { .. }
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic { name } => f.write_str(name.name()),
            Type::Named {
                package: Some(package),
                name,
                ..
            } => write!(f, "{}.{}", package, name),
            Type::Named {
                package: None,
                name,
                ..
            } => f.write_str(name),
            Type::Pointer { elem } => write!(f, "*{}", elem),
            Type::Slice { elem } => write!(f, "[]{}", elem),
            Type::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Chan { elem } => write!(f, "chan {}", elem),
            Type::Func => f.write_str("func"),
            Type::Interface { methods } if methods.is_empty() => f.write_str("interface{}"),
            Type::Interface { methods } => write!(f, "interface{{{}}}", methods.join("; ")),
            Type::Struct { fields } => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
            Type::Tuple { items } => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Type::Invalid => f.write_str("invalid type"),
        }
    }
}
