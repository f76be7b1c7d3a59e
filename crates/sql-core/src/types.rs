//! Apache Iceberg-style type system: primitives, `decimal(P,S)`, and the
//! nested `list`/`map`/`struct` grammar from spec.md §4.2.
//!
//! Validation here is pure: no allocation beyond the parsed tree, no I/O,
//! no dependency on a catalog. The catalog adapter (`sql-catalog`) may
//! layer additional, schema-aware rules on top.

use std::fmt;

/// A validated Iceberg type.
#[derive(Debug, Clone, PartialEq)]
pub enum IcebergType {
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Binary,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Decimal { precision: u32, scale: u32 },
    List(Box<IcebergType>),
    Map(Box<IcebergType>, Box<IcebergType>),
    Struct(Vec<StructField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: IcebergType,
}

/// Primitive keywords recognized verbatim, in the spelling Iceberg uses.
const PRIMITIVES: &[(&str, IcebergType)] = &[
    ("boolean", IcebergType::Boolean),
    ("int32", IcebergType::Int32),
    ("int64", IcebergType::Int64),
    ("float32", IcebergType::Float32),
    ("float64", IcebergType::Float64),
    ("string", IcebergType::String),
    ("binary", IcebergType::Binary),
    ("date", IcebergType::Date),
    ("time", IcebergType::Time),
    ("timestamp", IcebergType::Timestamp),
    ("timestamptz", IcebergType::TimestampTz),
    ("uuid", IcebergType::Uuid),
];

/// Legacy SQL spellings mapped to their Iceberg replacement, used to
/// produce "did you mean" type errors rather than opaque syntax errors.
pub const LEGACY_TYPE_SUGGESTIONS: &[(&str, &str)] = &[
    ("varchar", "string"),
    ("char", "string"),
    ("text", "string"),
    ("int", "int32"),
    ("integer", "int32"),
    ("bigint", "int64"),
    ("smallint", "int32"),
    ("float", "float32"),
    ("double", "float64"),
    ("real", "float32"),
    ("bool", "boolean"),
    ("blob", "binary"),
    ("bytea", "binary"),
    ("datetime", "timestamp"),
    ("decimal", "decimal(P,S)"),
    ("numeric", "decimal(P,S)"),
];

/// Error returned by the pure type grammar validator in this module.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    UnknownType(String),
    LegacySpelling { found: String, suggestion: String },
    UnbalancedBrackets(String),
    InvalidDecimal(String),
    DuplicateStructField(String),
    Empty,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnknownType(t) => write!(f, "unknown Iceberg type `{t}`"),
            TypeError::LegacySpelling { found, suggestion } => {
                write!(f, "`{found}` is not an Iceberg type; use `{suggestion}`")
            }
            TypeError::UnbalancedBrackets(t) => write!(f, "unbalanced brackets in type `{t}`"),
            TypeError::InvalidDecimal(t) => write!(f, "invalid decimal(P,S) spec `{t}`"),
            TypeError::DuplicateStructField(name) => {
                write!(f, "duplicate struct field name `{name}`")
            }
            TypeError::Empty => write!(f, "empty type string"),
        }
    }
}

impl std::error::Error for TypeError {}

impl fmt::Display for IcebergType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcebergType::Boolean => write!(f, "boolean"),
            IcebergType::Int32 => write!(f, "int32"),
            IcebergType::Int64 => write!(f, "int64"),
            IcebergType::Float32 => write!(f, "float32"),
            IcebergType::Float64 => write!(f, "float64"),
            IcebergType::String => write!(f, "string"),
            IcebergType::Binary => write!(f, "binary"),
            IcebergType::Date => write!(f, "date"),
            IcebergType::Time => write!(f, "time"),
            IcebergType::Timestamp => write!(f, "timestamp"),
            IcebergType::TimestampTz => write!(f, "timestamptz"),
            IcebergType::Uuid => write!(f, "uuid"),
            IcebergType::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            IcebergType::List(inner) => write!(f, "list<{inner}>"),
            IcebergType::Map(k, v) => write!(f, "map<{k},{v}>"),
            IcebergType::Struct(fields) => {
                write!(f, "struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", field.name, field.ty)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Validates a type string per the EBNF grammar in spec.md §4.2.
///
/// Pure function: given the same string, always returns the same result.
pub fn validate(input: &str) -> Result<IcebergType, TypeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TypeError::Empty);
    }
    let mut chars = TypeChars::new(trimmed);
    let ty = parse_type(&mut chars)?;
    chars.skip_ws();
    if !chars.at_end() {
        return Err(TypeError::UnbalancedBrackets(trimmed.to_string()));
    }
    Ok(ty)
}

/// A minimal char cursor used only for re-validating complex type strings
/// (the lexer does the real tokenizing of source code; this is a second,
/// much smaller grammar nested inside a single DATATYPE token's text).
struct TypeChars<'a> {
    rest: &'a str,
}

impl<'a> TypeChars<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let mut it = self.rest.chars();
        let c = it.next()?;
        self.rest = it.as_str();
        Some(c)
    }

    fn expect(&mut self, c: char) -> Result<(), TypeError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(TypeError::UnbalancedBrackets(self.rest.to_string()))
        }
    }

    fn read_word(&mut self) -> String {
        self.skip_ws();
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn read_uint(&mut self) -> Result<u32, TypeError> {
        self.skip_ws();
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s.parse::<u32>()
            .map_err(|_| TypeError::InvalidDecimal(s.clone()))
    }
}

fn parse_type(chars: &mut TypeChars) -> Result<IcebergType, TypeError> {
    chars.skip_ws();
    let word = chars.read_word();
    if word.is_empty() {
        return Err(TypeError::UnbalancedBrackets(chars.rest.to_string()));
    }
    let lower = word.to_ascii_lowercase();

    if let Some((_, ty)) = PRIMITIVES.iter().find(|(name, _)| *name == lower) {
        return Ok(ty.clone());
    }

    if lower == "decimal" {
        chars.skip_ws();
        if chars.peek() != Some('(') {
            return Err(TypeError::InvalidDecimal(
                "decimal requires (precision,scale)".to_string(),
            ));
        }
        chars.bump();
        let precision = chars.read_uint()?;
        chars.expect(',')?;
        let scale = chars.read_uint()?;
        chars.expect(')')?;
        if precision == 0 || precision > 38 || scale > precision {
            return Err(TypeError::InvalidDecimal(format!(
                "decimal({precision},{scale})"
            )));
        }
        return Ok(IcebergType::Decimal { precision, scale });
    }

    if lower == "list" {
        chars.expect('<')?;
        let inner = parse_type(chars)?;
        chars.expect('>')?;
        return Ok(IcebergType::List(Box::new(inner)));
    }

    if lower == "map" {
        chars.expect('<')?;
        let key = parse_type(chars)?;
        chars.expect(',')?;
        let value = parse_type(chars)?;
        chars.expect('>')?;
        return Ok(IcebergType::Map(Box::new(key), Box::new(value)));
    }

    if lower == "struct" {
        chars.expect('<')?;
        let mut fields = Vec::new();
        let mut seen = std::collections::HashSet::new();
        loop {
            chars.skip_ws();
            let name = chars.read_word();
            if name.is_empty() {
                return Err(TypeError::UnbalancedBrackets(chars.rest.to_string()));
            }
            if !seen.insert(name.clone()) {
                return Err(TypeError::DuplicateStructField(name));
            }
            chars.expect(':')?;
            let field_ty = parse_type(chars)?;
            fields.push(StructField {
                name,
                ty: field_ty,
            });
            chars.skip_ws();
            match chars.peek() {
                Some(',') => {
                    chars.bump();
                }
                Some('>') => {
                    chars.bump();
                    break;
                }
                _ => return Err(TypeError::UnbalancedBrackets(chars.rest.to_string())),
            }
        }
        return Ok(IcebergType::Struct(fields));
    }

    if let Some((_, suggestion)) = LEGACY_TYPE_SUGGESTIONS
        .iter()
        .find(|(legacy, _)| *legacy == lower)
    {
        return Err(TypeError::LegacySpelling {
            found: word,
            suggestion: suggestion.to_string(),
        });
    }

    Err(TypeError::UnknownType(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_roundtrip() {
        for (name, _) in PRIMITIVES {
            let parsed = validate(name).unwrap();
            assert_eq!(parsed.to_string(), *name);
        }
    }

    #[test]
    fn decimal_bounds() {
        assert!(validate("decimal(10,2)").is_ok());
        assert!(validate("decimal(38,38)").is_ok());
        assert!(validate("decimal(0,0)").is_err());
        assert!(validate("decimal(39,0)").is_err());
        assert!(validate("decimal(5,6)").is_err());
        assert!(matches!(validate("decimal"), Err(TypeError::InvalidDecimal(_))));
    }

    #[test]
    fn nested_list_map_struct() {
        assert!(validate("list<string>").is_ok());
        assert!(validate("map<string,int64>").is_ok());
        assert!(validate("struct<a:int32,b:list<string>>").is_ok());
        assert!(validate("struct<a:int32,a:string>").is_err());
    }

    #[test]
    fn legacy_spellings_suggest_iceberg_type() {
        match validate("varchar") {
            Err(TypeError::LegacySpelling { found, suggestion }) => {
                assert_eq!(found, "varchar");
                assert_eq!(suggestion, "string");
            }
            other => panic!("expected legacy spelling error, got {other:?}"),
        }
        match validate("INT") {
            Err(TypeError::LegacySpelling { suggestion, .. }) => assert_eq!(suggestion, "int32"),
            other => panic!("expected legacy spelling error, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_brackets_rejected() {
        assert!(validate("list<string").is_err());
        assert!(validate("map<string,int64").is_err());
    }

    #[test]
    fn round_trip_closed_under_reparse() {
        let cases = [
            "decimal(10,2)",
            "list<string>",
            "map<string,int64>",
            "struct<a:int32,b:string>",
        ];
        for c in cases {
            let t1 = validate(c).unwrap();
            let t2 = validate(&t1.to_string()).unwrap();
            assert_eq!(t1, t2);
        }
    }
}
