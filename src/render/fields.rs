use crate::error::AstroError;
use log::debug;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Sunrise,
    Sunset,
    Moonrise,
    Moonset,
    MoonPhase,
    /// Only shown when asked for by name; `all` leaves it out.
    Illumination,
}

/// What `all` expands to.
pub const BASE_FIELDS: [Field; 6] = [
    Field::Date,
    Field::Sunrise,
    Field::Sunset,
    Field::Moonrise,
    Field::Moonset,
    Field::MoonPhase,
];

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Sunrise => "sunrise",
            Field::Sunset => "sunset",
            Field::Moonrise => "moonrise",
            Field::Moonset => "moonset",
            Field::MoonPhase => "moonphase",
            Field::Illumination => "illumination",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Sunrise => "Sunrise",
            Field::Sunset => "Sunset",
            Field::Moonrise => "Moonrise",
            Field::Moonset => "Moonset",
            Field::MoonPhase => "Moon phase",
            Field::Illumination => "Illumination",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        match name.trim().to_ascii_lowercase().as_str() {
            "date" => Some(Field::Date),
            "sunrise" => Some(Field::Sunrise),
            "sunset" => Some(Field::Sunset),
            "moonrise" => Some(Field::Moonrise),
            "moonset" => Some(Field::Moonset),
            "moonphase" => Some(Field::MoonPhase),
            "illumination" => Some(Field::Illumination),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered, de-duplicated list of columns to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<Field>,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self {
            fields: BASE_FIELDS.to_vec(),
        }
    }

    /// Parses a comma-separated list or `all`. Blank input means `all`.
    /// Unknown names are dropped; if nothing valid remains the request fails.
    pub fn parse(raw: &str) -> Result<Self, AstroError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let mut fields = Vec::new();
        for token in trimmed.split(',') {
            match Field::from_name(token) {
                Some(field) if !fields.contains(&field) => fields.push(field),
                Some(_) => {}
                None => debug!("Ignoring unknown field '{}'", token.trim()),
            }
        }
        if fields.is_empty() {
            return Err(AstroError::NoValidFields(raw.to_string()));
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
