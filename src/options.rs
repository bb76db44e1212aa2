//! Type and field options
//!
//! JADN attaches constraints to type definitions and fields as an ordered
//! list of tagged strings: one tag character followed by a payload
//! (`"{1"` is `minv = 1`, `"*Target"` is `vtype = Target`, `"[0"` is
//! `minc = 0`). [`Options`] is the structured form of such a list.
//!
//! Parsing and serialization round-trip: `Options::parse(&o.serialize())`
//! always yields `o` again. Tags this crate does not know are kept verbatim
//! in [`Options::unknown`] and re-emitted after the known ones.

use crate::error::ParseError;
use serde_json::Value;

/// Option tag characters (JADN v1.0)
pub mod tag {
    /// Items and fields are denoted by id rather than name
    pub const ID: char = '=';
    /// Value type for ArrayOf and MapOf
    pub const VTYPE: char = '*';
    /// Key type for MapOf
    pub const KTYPE: char = '+';
    /// Enumerated type derived from the fields of a type
    pub const ENUM: char = '#';
    /// Enumerated type of pointers derived from a type
    pub const POINTER: char = '>';
    /// Semantic validation keyword
    pub const FORMAT: char = '/';
    /// Regular expression for String values
    pub const PATTERN: char = '%';
    /// Minimum real value
    pub const MINF: char = 'y';
    /// Maximum real value
    pub const MAXF: char = 'z';
    /// Minimum integer value, length or element count
    pub const MINV: char = '{';
    /// Maximum integer value, length or element count
    pub const MAXV: char = '}';
    /// ArrayOf instance must not contain duplicates
    pub const UNIQUE: char = 'q';
    /// ArrayOf instance is unordered and unique
    pub const SET: char = 's';
    /// ArrayOf instance is unordered
    pub const UNORDERED: char = 'b';
    /// Type is extensible
    pub const EXTEND: char = 'X';
    /// Default value
    pub const DEFAULT: char = '!';
    /// Minimum field cardinality
    pub const MINC: char = '[';
    /// Maximum field cardinality
    pub const MAXC: char = ']';
    /// Field holding the explicit tag of a Choice
    pub const TAGID: char = '&';
    /// Field name used as a qualifier for the fields of its type
    pub const DIR: char = '<';
    /// Field is a primary key
    pub const KEY: char = 'K';
    /// Field is a link to a type instance
    pub const LINK: char = 'L';
}

/// Structured constraint set attached to a type or a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// `=` compare selector and field members by id
    pub id: bool,
    /// `*` value type reference
    pub vtype: Option<String>,
    /// `+` key type reference
    pub ktype: Option<String>,
    /// `#` derived enumeration source type
    pub enumeration: Option<String>,
    /// `>` derived pointer enumeration source type
    pub pointer: Option<String>,
    /// `/` semantic format keyword
    pub format: Option<String>,
    /// `%` regular expression
    pub pattern: Option<String>,
    /// `y` minimum real value
    pub minf: Option<f64>,
    /// `z` maximum real value
    pub maxf: Option<f64>,
    /// `{` minimum integer value, length or count
    pub minv: Option<i64>,
    /// `}` maximum integer value, length or count
    pub maxv: Option<i64>,
    /// `q` no duplicate elements
    pub unique: bool,
    /// `s` unordered and unique
    pub set: bool,
    /// `b` unordered
    pub unordered: bool,
    /// `X` extensible
    pub extend: bool,
    /// `!` default value
    pub default: Option<String>,
    /// `[` minimum cardinality
    pub minc: Option<i64>,
    /// `]` maximum cardinality
    pub maxc: Option<i64>,
    /// `&` tag field id
    pub tagid: Option<i64>,
    /// `<` field name is a qualifier
    pub dir: bool,
    /// `K` primary key
    pub key: bool,
    /// `L` link
    pub link: bool,
    /// Unrecognized options, kept verbatim
    pub unknown: Vec<String>,
}

impl Options {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a compact option list
    pub fn parse<S: AsRef<str>>(items: &[S]) -> Result<Self, ParseError> {
        let mut opts = Options::new();
        let mut seen: Vec<char> = Vec::with_capacity(items.len());

        for item in items {
            let item = item.as_ref();
            let mut chars = item.chars();
            let key = chars
                .next()
                .ok_or_else(|| ParseError::new("Empty option string"))?;
            let payload = chars.as_str();

            if seen.contains(&key) {
                return Err(ParseError::new(format!("Duplicate option '{}'", key))
                    .with_source(item.to_string()));
            }

            match key {
                tag::ID => opts.id = parse_flag(item, payload)?,
                tag::VTYPE => opts.vtype = Some(parse_name(item, payload)?),
                tag::KTYPE => opts.ktype = Some(parse_name(item, payload)?),
                tag::ENUM => opts.enumeration = Some(parse_name(item, payload)?),
                tag::POINTER => opts.pointer = Some(parse_name(item, payload)?),
                tag::FORMAT => opts.format = Some(parse_name(item, payload)?),
                tag::PATTERN => opts.pattern = Some(payload.to_string()),
                tag::MINF => opts.minf = Some(parse_real(item, payload)?),
                tag::MAXF => opts.maxf = Some(parse_real(item, payload)?),
                tag::MINV => opts.minv = Some(parse_integer(item, payload)?),
                tag::MAXV => opts.maxv = Some(parse_integer(item, payload)?),
                tag::UNIQUE => opts.unique = parse_flag(item, payload)?,
                tag::SET => opts.set = parse_flag(item, payload)?,
                tag::UNORDERED => opts.unordered = parse_flag(item, payload)?,
                tag::EXTEND => opts.extend = parse_flag(item, payload)?,
                tag::DEFAULT => opts.default = Some(payload.to_string()),
                tag::MINC => opts.minc = Some(parse_integer(item, payload)?),
                tag::MAXC => opts.maxc = Some(parse_integer(item, payload)?),
                tag::TAGID => opts.tagid = Some(parse_integer(item, payload)?),
                tag::DIR => opts.dir = parse_flag(item, payload)?,
                tag::KEY => opts.key = parse_flag(item, payload)?,
                tag::LINK => opts.link = parse_flag(item, payload)?,
                _ => {
                    opts.unknown.push(item.to_string());
                    continue;
                }
            }
            seen.push(key);
        }

        Ok(opts)
    }

    /// Parse the option list of an array-form entry
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        let items = value
            .as_array()
            .ok_or_else(|| ParseError::new("Options must be an array of strings"))?;
        let strings = items
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| ParseError::new(format!("Option {} is not a string", v)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::parse(&strings)
    }

    /// Re-emit the compact option list
    ///
    /// Field options come first, then type options, then unknown options,
    /// each group in tag-table order.
    pub fn serialize(&self) -> Vec<String> {
        let mut out = Vec::new();
        let int = |out: &mut Vec<String>, t: char, v: Option<i64>| {
            if let Some(v) = v {
                out.push(format!("{}{}", t, v));
            }
        };
        let real = |out: &mut Vec<String>, t: char, v: Option<f64>| {
            if let Some(v) = v {
                out.push(format!("{}{}", t, v));
            }
        };
        let text = |out: &mut Vec<String>, t: char, v: &Option<String>| {
            if let Some(v) = v {
                out.push(format!("{}{}", t, v));
            }
        };
        let flag = |out: &mut Vec<String>, t: char, v: bool| {
            if v {
                out.push(t.to_string());
            }
        };

        int(&mut out, tag::MINC, self.minc);
        int(&mut out, tag::MAXC, self.maxc);
        int(&mut out, tag::TAGID, self.tagid);
        flag(&mut out, tag::DIR, self.dir);
        flag(&mut out, tag::KEY, self.key);
        flag(&mut out, tag::LINK, self.link);

        flag(&mut out, tag::ID, self.id);
        text(&mut out, tag::VTYPE, &self.vtype);
        text(&mut out, tag::KTYPE, &self.ktype);
        text(&mut out, tag::ENUM, &self.enumeration);
        text(&mut out, tag::POINTER, &self.pointer);
        text(&mut out, tag::FORMAT, &self.format);
        text(&mut out, tag::PATTERN, &self.pattern);
        real(&mut out, tag::MINF, self.minf);
        real(&mut out, tag::MAXF, self.maxf);
        int(&mut out, tag::MINV, self.minv);
        int(&mut out, tag::MAXV, self.maxv);
        flag(&mut out, tag::UNIQUE, self.unique);
        flag(&mut out, tag::SET, self.set);
        flag(&mut out, tag::UNORDERED, self.unordered);
        flag(&mut out, tag::EXTEND, self.extend);
        text(&mut out, tag::DEFAULT, &self.default);

        out.extend(self.unknown.iter().cloned());
        out
    }

    /// Serialize into a JSON array value
    pub fn to_value(&self) -> Value {
        Value::Array(self.serialize().into_iter().map(Value::String).collect())
    }

    /// Check whether no option is set
    pub fn is_empty(&self) -> bool {
        self == &Options::default()
    }

    /// Merge a more specific option set over this one
    ///
    /// Values present in `overlay` win; absent values are inherited.
    pub fn merge(&self, overlay: &Options) -> Options {
        let mut unknown = self.unknown.clone();
        for u in &overlay.unknown {
            if !unknown.contains(u) {
                unknown.push(u.clone());
            }
        }

        Options {
            id: overlay.id || self.id,
            vtype: overlay.vtype.clone().or_else(|| self.vtype.clone()),
            ktype: overlay.ktype.clone().or_else(|| self.ktype.clone()),
            enumeration: overlay
                .enumeration
                .clone()
                .or_else(|| self.enumeration.clone()),
            pointer: overlay.pointer.clone().or_else(|| self.pointer.clone()),
            format: overlay.format.clone().or_else(|| self.format.clone()),
            pattern: overlay.pattern.clone().or_else(|| self.pattern.clone()),
            minf: overlay.minf.or(self.minf),
            maxf: overlay.maxf.or(self.maxf),
            minv: overlay.minv.or(self.minv),
            maxv: overlay.maxv.or(self.maxv),
            unique: overlay.unique || self.unique,
            set: overlay.set || self.set,
            unordered: overlay.unordered || self.unordered,
            extend: overlay.extend || self.extend,
            default: overlay.default.clone().or_else(|| self.default.clone()),
            minc: overlay.minc.or(self.minc),
            maxc: overlay.maxc.or(self.maxc),
            tagid: overlay.tagid.or(self.tagid),
            dir: overlay.dir || self.dir,
            key: overlay.key || self.key,
            link: overlay.link || self.link,
            unknown,
        }
    }

    /// The field-level subset (`[ ] & < K L`)
    pub fn field_options(&self) -> Options {
        Options {
            minc: self.minc,
            maxc: self.maxc,
            tagid: self.tagid,
            dir: self.dir,
            key: self.key,
            link: self.link,
            ..Options::default()
        }
    }

    /// The type-level subset: everything except the field-level options
    pub fn type_options(&self) -> Options {
        Options {
            minc: None,
            maxc: None,
            tagid: None,
            dir: false,
            key: false,
            link: false,
            ..self.clone()
        }
    }

    /// Check whether any type-level option is set
    pub fn has_type_options(&self) -> bool {
        !self.type_options().is_empty()
    }

    /// Collection is unique, either explicitly or as a set
    pub fn is_unique(&self) -> bool {
        self.unique || self.set
    }

    /// Rewrite the type references held by this option set
    pub fn map_references<E>(
        &self,
        mut f: impl FnMut(&str) -> Result<String, E>,
    ) -> Result<Options, E> {
        let mut out = self.clone();
        for slot in [
            &mut out.vtype,
            &mut out.ktype,
            &mut out.enumeration,
            &mut out.pointer,
        ] {
            if let Some(reference) = slot.take() {
                *slot = Some(map_reference(&reference, &mut f)?);
            }
        }
        Ok(out)
    }

    /// Type references held by this option set, derived-enum markers stripped
    pub fn references(&self) -> Vec<&str> {
        [&self.vtype, &self.ktype, &self.enumeration, &self.pointer]
            .into_iter()
            .flatten()
            .map(|r| strip_derived(r).1)
            .collect()
    }
}

/// Split a `ktype`/`vtype` reference into its derived-enumeration marker
/// and the referenced type name (`"#Target"` → `(true, "Target")`)
pub fn strip_derived(reference: &str) -> (bool, &str) {
    match reference.strip_prefix(tag::ENUM) {
        Some(name) => (true, name),
        None => (false, reference),
    }
}

fn map_reference<E>(
    reference: &str,
    f: &mut impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let (derived, name) = strip_derived(reference);
    let mapped = f(name)?;
    Ok(if derived {
        format!("{}{}", tag::ENUM, mapped)
    } else {
        mapped
    })
}

fn parse_flag(item: &str, payload: &str) -> Result<bool, ParseError> {
    if payload.is_empty() {
        Ok(true)
    } else {
        Err(ParseError::new("Boolean option takes no value").with_source(item.to_string()))
    }
}

fn parse_name(item: &str, payload: &str) -> Result<String, ParseError> {
    if payload.is_empty() {
        Err(ParseError::new("Option requires a value").with_source(item.to_string()))
    } else {
        Ok(payload.to_string())
    }
}

fn parse_integer(item: &str, payload: &str) -> Result<i64, ParseError> {
    payload.parse::<i64>().map_err(|_| {
        ParseError::new("Option requires an integer value").with_source(item.to_string())
    })
}

fn parse_real(item: &str, payload: &str) -> Result<f64, ParseError> {
    match payload.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::new("Option requires a finite real value")
            .with_source(item.to_string())),
    }
}
