//! Address shapes handed back to the caller, and the mapping from fetched
//! place details into them.

use serde::{Deserialize, Serialize};

/// One component of a fetched place, as returned by the Places details API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    #[must_use]
    pub fn new(long_name: &str, short_name: &str, types: &[&str]) -> Self {
        Self {
            long_name: long_name.to_owned(),
            short_name: short_name.to_owned(),
            types: types.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

/// A place resolved from a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl PlaceDetails {
    fn component(&self, ty: &str) -> Option<&AddressComponent> {
        self.address_components.iter().find(|c| c.has_type(ty))
    }

    fn long_name(&self, ty: &str) -> Option<String> {
        self.component(ty).map(|c| c.long_name.clone())
    }

    fn short_name(&self, ty: &str) -> Option<String> {
        self.component(ty).map(|c| c.short_name.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    /// Maps place components into an address.
    ///
    /// `line1` is the street number and route; when neither is present it
    /// falls back to the premise and then to the first comma-separated segment
    /// of the formatted address.
    #[must_use]
    pub fn from_place(place: &PlaceDetails) -> Self {
        let street: Vec<String> = ["street_number", "route"]
            .iter()
            .filter_map(|ty| place.long_name(ty))
            .filter(|s| !s.is_empty())
            .collect();
        let line1 = if street.is_empty() {
            place.long_name("premise").or_else(|| {
                place
                    .formatted_address
                    .as_deref()
                    .and_then(|f| f.split(',').next())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            })
        } else {
            Some(street.join(" "))
        };

        let city = [
            "locality",
            "postal_town",
            "sublocality_level_1",
            "sublocality",
            "administrative_area_level_2",
        ]
        .iter()
        .find_map(|ty| place.long_name(ty));

        let postal_code = place.long_name("postal_code").map(|code| {
            match place.long_name("postal_code_suffix") {
                Some(suffix) => format!("{code}-{suffix}"),
                None => code,
            }
        });

        Self {
            line1,
            line2: place.long_name("subpremise"),
            city,
            state: place.short_name("administrative_area_level_1"),
            postal_code,
            country: place.short_name("country"),
        }
    }

    /// An address carrying only a freeform first line.
    #[must_use]
    pub fn manual(line: &str) -> Self {
        Self {
            line1: Some(line.to_owned()),
            ..Self::default()
        }
    }
}

/// The single terminal result of an autocomplete session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressResult {
    /// A place was selected and fetched.
    Resolved { address: Address },
    /// The typed line, used as-is.
    Manual { line: String },
    None,
}

impl AddressResult {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AddressResult::Resolved { .. } => "resolved",
            AddressResult::Manual { .. } => "manual",
            AddressResult::None => "none",
        }
    }

    /// The address to hand to a form, if any.
    #[must_use]
    pub fn into_address(self) -> Option<Address> {
        match self {
            AddressResult::Resolved { address } => Some(address),
            AddressResult::Manual { line } => Some(Address::manual(&line)),
            AddressResult::None => None,
        }
    }
}
