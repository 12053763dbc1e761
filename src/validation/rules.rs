//! Static rule table for the order form and catalog entries

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use super::{ErrorCode, ValidationError};
use crate::config::catalog::{Category, ConfigEntry};
use crate::constants::validation::*;
use crate::form::FormData;
use crate::generator::{sanitize_customer, strip_thousands_separators};

/// Success carries the normalized value
pub type FieldResult = Result<String, ValidationError>;

/// Form fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    OrderNumber,
    Customer,
    Position,
    Machine,
    Quantity,
    Product,
    PaperClass,
    Paper,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::OrderNumber,
        Field::Customer,
        Field::Position,
        Field::Machine,
        Field::Quantity,
        Field::Product,
        Field::PaperClass,
        Field::Paper,
    ];

    /// Form field name
    pub fn name(&self) -> &'static str {
        match self {
            Field::OrderNumber => "auftragsnummer",
            Field::Customer => "kunde",
            Field::Position => "auftragsposition",
            Field::Machine => "maschine",
            Field::Quantity => "auflage",
            Field::Product => "produkt",
            Field::PaperClass => "papierart",
            Field::Paper => "papiername",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::OrderNumber => "Order number",
            Field::Customer => "Customer",
            Field::Position => "Order position",
            Field::Machine => "Machine",
            Field::Quantity => "Quantity",
            Field::Product => "Product",
            Field::PaperClass => "Paper class",
            Field::Paper => "Paper",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Catalog list the field's value is looked up in
    pub fn category(&self) -> Option<Category> {
        match self {
            Field::Machine => Some(Category::Machines),
            Field::Product => Some(Category::Products),
            Field::Paper => Some(Category::Papers),
            _ => None,
        }
    }

    fn value<'a>(&self, form: &'a FormData) -> &'a str {
        match self {
            Field::OrderNumber => &form.auftragsnummer,
            Field::Customer => &form.kunde,
            Field::Position => &form.auftragsposition,
            Field::Machine => &form.maschine,
            Field::Quantity => &form.auflage,
            Field::Product => &form.produkt,
            Field::PaperClass => &form.papierart,
            Field::Paper => &form.papiername,
        }
    }

    fn value_mut<'a>(&self, form: &'a mut FormData) -> &'a mut String {
        match self {
            Field::OrderNumber => &mut form.auftragsnummer,
            Field::Customer => &mut form.kunde,
            Field::Position => &mut form.auftragsposition,
            Field::Machine => &mut form.maschine,
            Field::Quantity => &mut form.auflage,
            Field::Product => &mut form.produkt,
            Field::PaperClass => &mut form.papierart,
            Field::Paper => &mut form.papiername,
        }
    }
}

/// Applied before any check; the result is what callers get back
#[derive(Debug, Clone, Copy)]
enum Normalize {
    Trim,
    Upper,
    Lower,
    Digits,
}

impl Normalize {
    fn apply(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match self {
            Normalize::Trim => trimmed.to_string(),
            Normalize::Upper => trimmed.to_uppercase(),
            Normalize::Lower => trimmed.to_lowercase(),
            Normalize::Digits => strip_thousands_separators(trimmed),
        }
    }
}

#[derive(Debug)]
struct FieldRule {
    label: &'static str,
    required: bool,
    normalize: Normalize,
    pattern: Option<(Regex, &'static str)>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    min: Option<i64>,
    max: Option<i64>,
    allowed: Option<&'static [&'static str]>,
}

impl FieldRule {
    fn new(label: &'static str, normalize: Normalize) -> Self {
        Self {
            label,
            required: true,
            normalize,
            pattern: None,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            allowed: None,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn pattern(mut self, pattern: &str, hint: &'static str) -> Self {
        let regex = Regex::new(pattern).expect("field rule patterns are valid");
        self.pattern = Some((regex, hint));
        self
    }

    fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    fn check(&self, field: &str, raw: &str) -> FieldResult {
        let value = self.normalize.apply(raw);
        let fail = |code, message: String| Err(ValidationError::new(field, code, message));

        if value.is_empty() {
            return if self.required {
                fail(ErrorCode::Required, format!("{} is required", self.label))
            } else {
                Ok(value)
            };
        }

        let chars = value.chars().count();
        if let Some(min) = self.min_length {
            if chars < min {
                return fail(ErrorCode::MinLength, format!("{} needs at least {min} characters", self.label));
            }
        }
        if let Some(max) = self.max_length {
            if chars > max {
                return fail(ErrorCode::MaxLength, format!("{} allows at most {max} characters", self.label));
            }
        }

        if let Some((regex, hint)) = &self.pattern {
            if !regex.is_match(&value) {
                return fail(ErrorCode::Pattern, format!("{} {hint}", self.label));
            }
        }

        if self.min.is_some() || self.max.is_some() {
            let number = match value.parse::<i64>() {
                Ok(number) => number,
                // Digit strings beyond i64 are simply too large
                Err(_) if value.chars().all(|c| c.is_ascii_digit()) => i64::MAX,
                Err(_) => return fail(ErrorCode::NotANumber, format!("{} must be a number", self.label)),
            };
            if let Some(min) = self.min {
                if number < min {
                    return fail(ErrorCode::MinValue, format!("{} must be at least {min}", self.label));
                }
            }
            if let Some(max) = self.max {
                if number > max {
                    return fail(ErrorCode::MaxValue, format!("{} must be at most {max}", self.label));
                }
            }
        }

        if let Some(allowed) = self.allowed {
            if !allowed.contains(&value.as_str()) {
                return fail(
                    ErrorCode::InvalidOption,
                    format!("{} must be one of: {}", self.label, allowed.join(", ")),
                );
            }
        }

        Ok(value)
    }
}

const PAPER_TYPES: &[&str] = &["gestrichen", "ungestrichen"];

static FIELD_RULES: LazyLock<HashMap<Field, FieldRule>> = LazyLock::new(|| {
    HashMap::from([
        (
            Field::OrderNumber,
            FieldRule::new(Field::OrderNumber.label(), Normalize::Upper)
                .length(2, ORDER_MAX_LENGTH)
                .pattern(r"^A\d+$", "must be 'A' followed by digits"),
        ),
        (
            Field::Customer,
            FieldRule::new(Field::Customer.label(), Normalize::Trim)
                .length(1, CUSTOMER_MAX_LENGTH)
                .pattern(r"^[\p{L}\p{N} .,&'+/()-]+$", "contains unsupported characters"),
        ),
        (
            Field::Position,
            FieldRule::new(Field::Position.label(), Normalize::Trim)
                .pattern(r"^\d+$", "must be a whole number")
                .range(POSITION_MIN, POSITION_MAX),
        ),
        (
            Field::Machine,
            FieldRule::new(Field::Machine.label(), Normalize::Trim)
                .length(1, CODE_MAX_LENGTH)
                .pattern(r"^[A-Za-z0-9_.-]+$", "may only contain letters, digits, '.', '_' and '-'"),
        ),
        (
            Field::Quantity,
            FieldRule::new(Field::Quantity.label(), Normalize::Digits)
                .pattern(r"^\d+$", "must be a whole number")
                .range(QUANTITY_MIN, QUANTITY_MAX),
        ),
        (
            Field::Product,
            FieldRule::new(Field::Product.label(), Normalize::Trim)
                .length(1, CODE_MAX_LENGTH)
                .pattern(r"^[A-Za-z0-9_.-]+$", "may only contain letters, digits, '.', '_' and '-'"),
        ),
        (
            Field::PaperClass,
            FieldRule::new(Field::PaperClass.label(), Normalize::Lower)
                .length(2, PAPER_CLASS_MAX_LENGTH)
                .pattern(r"^\p{L}[\p{L} -]*$", "must start with a letter"),
        ),
        (
            Field::Paper,
            FieldRule::new(Field::Paper.label(), Normalize::Trim)
                .length(1, CODE_MAX_LENGTH)
                .pattern(r"^[A-Za-z0-9_.-]+$", "may only contain letters, digits, '.', '_' and '-'"),
        ),
    ])
});

static ENTRY_NAME_RULE: LazyLock<FieldRule> =
    LazyLock::new(|| FieldRule::new("Name", Normalize::Trim).length(1, ENTRY_NAME_MAX_LENGTH));

static ENTRY_CODE_RULE: LazyLock<FieldRule> = LazyLock::new(|| {
    FieldRule::new("Code", Normalize::Trim)
        .length(1, CODE_MAX_LENGTH)
        .pattern(r"^[A-Za-z0-9_.-]+$", "may only contain letters, digits, '.', '_' and '-'")
});

static PAPER_TYPE_RULE: LazyLock<FieldRule> =
    LazyLock::new(|| FieldRule::new("Paper type", Normalize::Lower).optional().one_of(PAPER_TYPES));

pub fn validate_field(field: Field, value: &str) -> FieldResult {
    let value = FIELD_RULES[&field].check(field.name(), value)?;
    // Only ASCII letters, digits and umlauts survive into the code
    if field == Field::Customer && sanitize_customer(&value).is_empty() {
        return Err(ValidationError::new(
            field.name(),
            ErrorCode::Pattern,
            format!("{} needs at least one letter or digit", field.label()),
        ));
    }
    Ok(value)
}

pub fn validate_field_by_name(name: &str, value: &str) -> FieldResult {
    match Field::from_name(name) {
        Some(field) => validate_field(field, value),
        None => Err(ValidationError::new(
            name,
            ErrorCode::UnknownField,
            format!("Unknown field '{name}'"),
        )),
    }
}

/// Outcome of checking every form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    /// Input with every valid field replaced by its normalized value
    pub normalized: FormData,
    pub errors: Vec<ValidationError>,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_form(form: &FormData) -> FormValidation {
    let mut normalized = form.clone();
    let mut errors = Vec::new();

    for field in Field::ALL {
        match validate_field(field, field.value(form)) {
            Ok(value) => *field.value_mut(&mut normalized) = value,
            Err(err) => errors.push(err),
        }
    }

    debug!(errors = errors.len(), "Validated form");
    FormValidation { normalized, errors }
}

/// Name and code are always checked; `type` only means something for papers
pub fn validate_entry(category: Category, entry: &ConfigEntry) -> Result<(), ValidationError> {
    ENTRY_NAME_RULE.check("name", &entry.name)?;
    ENTRY_CODE_RULE.check("code", &entry.code)?;
    if entry.code.trim() != entry.code {
        return Err(ValidationError::new(
            "code",
            ErrorCode::Pattern,
            "Code must not have surrounding whitespace",
        ));
    }
    if category == Category::Papers {
        if let Some(entry_type) = &entry.entry_type {
            PAPER_TYPE_RULE.check("type", entry_type)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> FormData {
        FormData {
            auftragsnummer: "A12345".to_string(),
            kunde: "TestKunde".to_string(),
            auftragsposition: "1".to_string(),
            maschine: "CX75".to_string(),
            auflage: "1'200".to_string(),
            produkt: "BRFPP".to_string(),
            papierart: "ungestrichen".to_string(),
            papiername: "NoSat170".to_string(),
        }
    }

    fn code_of(result: FieldResult) -> ErrorCode {
        result.unwrap_err().code
    }

    #[test]
    fn test_order_number_pattern() {
        assert_eq!(validate_field(Field::OrderNumber, " a12345 ").unwrap(), "A12345");
        assert_eq!(code_of(validate_field(Field::OrderNumber, "12345")), ErrorCode::Pattern);
        assert_eq!(code_of(validate_field(Field::OrderNumber, "A12B45")), ErrorCode::Pattern);
        assert_eq!(code_of(validate_field(Field::OrderNumber, "B1")), ErrorCode::Pattern);
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(code_of(validate_field(Field::Customer, "   ")), ErrorCode::Required);
        assert_eq!(code_of(validate_field(Field::Paper, "")), ErrorCode::Required);
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(code_of(validate_field(Field::OrderNumber, "A")), ErrorCode::MinLength);
        let long = format!("A{}", "1".repeat(ORDER_MAX_LENGTH));
        assert_eq!(code_of(validate_field(Field::OrderNumber, &long)), ErrorCode::MaxLength);
    }

    #[test]
    fn test_position_bounds() {
        assert_eq!(validate_field(Field::Position, "0").unwrap(), "0");
        assert_eq!(validate_field(Field::Position, "999").unwrap(), "999");
        assert_eq!(code_of(validate_field(Field::Position, "1000")), ErrorCode::MaxValue);
        assert_eq!(code_of(validate_field(Field::Position, "-1")), ErrorCode::Pattern);
    }

    #[test]
    fn test_quantity_strips_separators() {
        assert_eq!(validate_field(Field::Quantity, "1'200").unwrap(), "1200");
        assert_eq!(validate_field(Field::Quantity, "10.000").unwrap(), "10000");
        assert_eq!(code_of(validate_field(Field::Quantity, "0")), ErrorCode::MinValue);
        assert_eq!(code_of(validate_field(Field::Quantity, "99999999999999999999999")), ErrorCode::MaxValue);
        assert_eq!(code_of(validate_field(Field::Quantity, "12x")), ErrorCode::Pattern);
    }

    #[test]
    fn test_customer_needs_code_characters() {
        assert_eq!(validate_field(Field::Customer, "Müller & Söhne").unwrap(), "Müller & Söhne");
        for customer in ["(-)", "--", "李明"] {
            assert_eq!(code_of(validate_field(Field::Customer, customer)), ErrorCode::Pattern, "{customer}");
        }
    }

    #[test]
    fn test_quantity_rejects_decimal_marks() {
        assert_eq!(code_of(validate_field(Field::Quantity, "1,5")), ErrorCode::Pattern);
        assert_eq!(code_of(validate_field(Field::Quantity, "1.20")), ErrorCode::Pattern);
        assert_eq!(validate_field(Field::Quantity, "1.200.000").unwrap(), "1200000");
    }

    #[test]
    fn test_field_category() {
        assert_eq!(Field::Paper.category(), Some(Category::Papers));
        assert_eq!(Field::Customer.category(), None);
    }

    #[test]
    fn test_paper_class_normalized_lowercase() {
        assert_eq!(validate_field(Field::PaperClass, "Ungestrichen").unwrap(), "ungestrichen");
        assert_eq!(validate_field(Field::PaperClass, "Recycling").unwrap(), "recycling");
        assert_eq!(code_of(validate_field(Field::PaperClass, "1x")), ErrorCode::Pattern);
    }

    #[test]
    fn test_validate_field_by_name() {
        assert_eq!(validate_field_by_name("kunde", "Muster AG").unwrap(), "Muster AG");
        let err = validate_field_by_name("farbe", "rot").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownField);
        assert_eq!(err.field, "farbe");
    }

    #[test]
    fn test_validate_form_valid() {
        let result = validate_form(&valid_form());
        assert!(result.is_valid());
        assert_eq!(result.normalized.auflage, "1200");
    }

    #[test]
    fn test_validate_form_collects_every_error() {
        let form = FormData {
            auftragsnummer: "X1".to_string(),
            auftragsposition: "5000".to_string(),
            ..valid_form()
        };
        let form = FormData {
            kunde: String::new(),
            ..form
        };
        let result = validate_form(&form);
        assert!(!result.is_valid());
        let codes: Vec<_> = result.errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
        assert_eq!(
            codes,
            [
                ("auftragsnummer", ErrorCode::Pattern),
                ("kunde", ErrorCode::Required),
                ("auftragsposition", ErrorCode::MaxValue),
            ]
        );
        // Valid fields are still normalized
        assert_eq!(result.normalized.auflage, "1200");
    }

    #[test]
    fn test_validate_entry() {
        let ok = ConfigEntry::new("Normset Satin", "NoSat170", Some("Gestrichen"));
        assert!(validate_entry(Category::Papers, &ok).is_ok());

        let bad_type = ConfigEntry::new("Normset Satin", "NoSat170", Some("matt"));
        assert_eq!(
            validate_entry(Category::Papers, &bad_type).unwrap_err().code,
            ErrorCode::InvalidOption
        );
        // Machines ignore the type
        assert!(validate_entry(Category::Machines, &ConfigEntry::new("CX", "CX75", Some("matt"))).is_ok());

        let no_name = ConfigEntry::new(" ", "CX75", None);
        assert_eq!(validate_entry(Category::Machines, &no_name).unwrap_err().field, "name");

        let padded = ConfigEntry::new("CX", " CX75", None);
        assert_eq!(validate_entry(Category::Machines, &padded).unwrap_err().code, ErrorCode::Pattern);
    }
}
