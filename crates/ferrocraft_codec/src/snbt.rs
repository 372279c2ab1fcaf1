//! Stringified NBT, the human-readable rendering used in logs and commands.
//!
//! Primitives print as plain decimal; byte/int/long arrays carry the `B;` /
//! `I;` / `L;` prefixes; strings are double-quoted with no escape handling;
//! compounds and lists use JSON-like braces and brackets with comma
//! separators.

use std::fmt;

use crate::nbt::{Nbt, NbtValue};

impl fmt::Display for NbtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => Ok(()),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::ByteArray(items) => {
                f.write_str("[B;")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::String(s) => write!(f, "\"{s}\""),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Compound(entries) => {
                f.write_str("{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
            Self::IntArray(items) => {
                f.write_str("[I;")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::LongArray(items) => {
                f.write_str("[L;")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_prints_jsonish() {
        let value = NbtValue::Compound(vec![
            ("name".into(), NbtValue::String("Bananrama".into())),
            ("count".into(), NbtValue::Byte(3)),
            ("pos".into(), NbtValue::List(vec![NbtValue::Int(1), NbtValue::Int(-2)])),
        ]);
        assert_eq!(value.to_string(), r#"{name:"Bananrama",count:3,pos:[1,-2]}"#);
    }

    #[test]
    fn arrays_carry_kind_prefixes() {
        assert_eq!(NbtValue::ByteArray(vec![1, 2, 250]).to_string(), "[B;1,2,250]");
        assert_eq!(NbtValue::IntArray(vec![-1]).to_string(), "[I;-1]");
        assert_eq!(NbtValue::LongArray(vec![]).to_string(), "[L;]");
    }

    #[test]
    fn floats_print_decimal() {
        assert_eq!(NbtValue::Double(1.5).to_string(), "1.5");
        assert_eq!(NbtValue::Float(-0.25).to_string(), "-0.25");
    }
}
