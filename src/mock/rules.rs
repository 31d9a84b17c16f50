//! Mock value rules for placeholder resolution.
//!
//! An ordered, immutable rule list maps placeholder names to literal text.
//! Precedence is positional: the first matching rule wins, so exact
//! enumeration mappings sit before exact literals, which sit before the
//! pattern classes. The rule set is a plain value handed to the synthesizer
//! at construction time, so tests can swap in alternate tables.

use serde::{Deserialize, Serialize};

/// How a matched pattern class produces its literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassValue {
    /// A fixed literal shared by every name in the class.
    Fixed(String),
    /// A quoted string derived from the placeholder name itself,
    /// e.g. `wall_name` becomes `"Mock wall_name"`.
    QuotedName,
}

/// One entry in the ordered rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MockRule {
    /// Exact name to a fully-qualified enumeration constant. Substituted
    /// inline; the harness imports put the constant in scope, so no local
    /// declaration is synthesized.
    EnumConstant { name: String, constant: String },
    /// Exact name to a literal. An empty literal deletes the token.
    ExactLiteral { name: String, literal: String },
    /// Names ending in one of the given suffixes.
    SuffixClass { suffixes: Vec<String>, literal: String },
    /// Names starting with one of the given prefixes.
    PrefixClass { prefixes: Vec<String>, literal: String },
    /// Names containing one of the given substrings.
    SubstringClass { needles: Vec<String>, value: ClassValue },
}

/// Outcome of resolving one placeholder name against the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Substitute this constant text directly, no declaration.
    EnumConstant(String),
    /// Declare a local carrying this literal, substitute the bare name.
    Literal(String),
    /// Delete the token entirely (names the harness supplies itself).
    Omit,
}

/// The ordered rule table.
#[derive(Debug, Clone)]
pub struct MockRuleSet {
    rules: Vec<MockRule>,
}

impl MockRuleSet {
    /// Builds a rule set from an explicit ordered rule list.
    pub fn new(rules: Vec<MockRule>) -> Self {
        Self { rules }
    }

    /// Resolves a placeholder name, or `None` when no rule matches and the
    /// caller should fall back to the sentinel literal.
    pub fn resolve(&self, name: &str) -> Option<Resolution> {
        let lower = name.to_ascii_lowercase();
        for rule in &self.rules {
            match rule {
                MockRule::EnumConstant { name: n, constant } if n == name => {
                    return Some(Resolution::EnumConstant(constant.clone()));
                }
                MockRule::ExactLiteral { name: n, literal } if n == name => {
                    return Some(if literal.is_empty() {
                        Resolution::Omit
                    } else {
                        Resolution::Literal(literal.clone())
                    });
                }
                MockRule::SuffixClass { suffixes, literal }
                    if suffixes.iter().any(|s| lower.ends_with(s.as_str())) =>
                {
                    return Some(Resolution::Literal(literal.clone()));
                }
                MockRule::PrefixClass { prefixes, literal }
                    if prefixes.iter().any(|p| lower.starts_with(p.as_str())) =>
                {
                    return Some(Resolution::Literal(literal.clone()));
                }
                MockRule::SubstringClass { needles, value }
                    if needles.iter().any(|s| lower.contains(s.as_str())) =>
                {
                    return Some(Resolution::Literal(match value {
                        ClassValue::Fixed(lit) => lit.clone(),
                        ClassValue::QuotedName => format!("\"Mock {}\"", name),
                    }));
                }
                _ => {}
            }
        }
        None
    }

    /// The standard production rule table.
    ///
    /// Exact entries mirror the curated mock table the corpus was validated
    /// against; the trailing pattern classes catch names the table never
    /// enumerated. Names matching nothing resolve to the sentinel upstream.
    pub fn standard() -> Self {
        let mut rules = Vec::new();

        // Domain enumerations, substituted inline.
        for name in ["built_in_category_enum", "buit_in_category_enum"] {
            rules.push(MockRule::EnumConstant {
                name: name.to_string(),
                constant: "BuiltInCategory.OST_Walls".to_string(),
            });
        }

        // Well-known names: strings.
        let strings = [
            ("level_name", r#""Mock Level""#),
            ("level_to_duplicate", r#""Mock Level""#),
            ("original_level_name", r#""Mock Level 1""#),
            ("new_level_name", r#""Mock Level 2""#),
            ("wall_type_name", r#""Mock Wall Type""#),
            ("original_name", r#""Original Name""#),
            ("new_name", r#""New Name""#),
            ("prefix", r#""PREFIX_""#),
            ("family_name", r#""Mock Family""#),
            ("room_name", r#""Mock Room""#),
            ("view_name", r#""Mock View""#),
            ("comment", r#""Mock Comment""#),
            ("door_type_name", r#""Mock Door Type""#),
            ("fire_rating", r#""60 min""#),
            ("fire_rating_value", r#""60 min""#),
            ("source_level", r#""Level 1""#),
            ("target_level", r#""Level 2""#),
            ("material_name", r#""Mock Material""#),
            ("workset_name", r#""Mock Workset""#),
            ("sheet_size", r#""A0""#),
            ("template_name", r#""New Mock Template""#),
            ("old_type_name", r#""Old Type Name""#),
            ("new_type_name", r#""New Type Name""#),
            ("mark_value", r#""M-01""#),
            ("level1_name", r#""Level 1""#),
            ("level2_name", r#""Level 2""#),
            ("type_name_substring", r#""Generic""#),
            ("parameter_name", r#""Comments""#),
            ("parameter_value", r#""Mock Value""#),
            ("text_to_find", r#""find_me""#),
            ("new_text", r#""replace_me""#),
            ("shape_name", r#""Mock Shape""#),
            ("sheet_number", r#""A-101""#),
            ("sheet_name", r#""Mock Sheet Name""#),
            ("description", r#""Mock Description""#),
            ("issued_by", r#""ML Engineer""#),
            ("date", r#""2024-01-01""#),
            // Parsed at runtime with Enum.Parse, so it stays a string.
            ("detail_level_enum", r#""Medium""#),
        ];

        // Well-known names: doubles.
        let doubles = [
            ("offset_m", "10.0"),
            ("elevation_m", "15.0"),
            ("thickness_mm", "150.0"),
            ("sill_height_mm", "900.0"),
            ("spacing_m", "5.0"),
            ("sill_height_m", "1.0"),
            ("height_m", "3.0"),
            ("thickness_cm", "20.0"),
            ("length_m", "10.0"),
            ("angle_degrees", "45.0"),
            ("width_m", "5.0"),
            ("slope_percentage", "5.0"),
            ("diameter_inch", "4.0"),
            ("width_mm", "300.0"),
            ("height_mm", "200.0"),
            ("text_size_mm", "2.5"),
            ("radius_m", "2.0"),
            ("distance_m", "10.0"),
            ("diameter_mm", "100.0"),
            ("value_m", "1.0"),
            ("size_m", "5.0"),
            // Coordinates.
            ("x1", "0.0"),
            ("y1", "0.0"),
            ("z1", "0.0"),
            ("x2", "10.0"),
            ("y2", "10.0"),
            ("z2", "0.0"),
            ("eye_x_m", "50.0"),
            ("eye_y_m", "-50.0"),
            ("eye_z_m", "50.0"),
            ("p1x_m", "0.0"),
            ("p1y_m", "0.0"),
            ("p1z_m", "3.0"),
            ("p2x_m", "10.0"),
            ("p2y_m", "0.0"),
            ("p2z_m", "3.0"),
            ("start_x", "0.0"),
            ("start_y", "0.0"),
            ("start_z", "0.0"),
            ("end_x", "10.0"),
            ("end_y", "10.0"),
            ("end_z", "0.0"),
            ("coord_x", "5.0"),
            ("coord_y", "5.0"),
            ("x_m", "5.0"),
            ("y_m", "5.0"),
            ("z_m", "3.0"),
        ];

        // Well-known names: integers.
        let integers = [
            ("num_worksets", "3"),
            ("rows", "5"),
            ("cols", "5"),
            ("num_horizontal", "4"),
            ("num_vertical", "6"),
            ("num_grids", "5"),
            ("color_r", "100"),
            ("color_g", "150"),
            ("color_b", "200"),
            ("transparency_percent", "50"),
        ];

        // Names the harness context already accounts for; the token is
        // deleted rather than substituted.
        let omitted = ["coordinates", "single_point", "floor_size_m", "duct_size_mm"];

        for (name, literal) in strings.iter().chain(doubles.iter()).chain(integers.iter()) {
            rules.push(MockRule::ExactLiteral {
                name: name.to_string(),
                literal: literal.to_string(),
            });
        }
        for name in omitted {
            rules.push(MockRule::ExactLiteral {
                name: name.to_string(),
                literal: String::new(),
            });
        }

        // Pattern classes, checked only after every exact entry.
        rules.push(MockRule::SuffixClass {
            suffixes: vec!["_r".to_string(), "_g".to_string(), "_b".to_string()],
            literal: "128".to_string(),
        });
        rules.push(MockRule::SubstringClass {
            needles: vec!["percent".to_string()],
            value: ClassValue::Fixed("50".to_string()),
        });
        rules.push(MockRule::PrefixClass {
            prefixes: vec!["num_".to_string(), "count".to_string()],
            literal: "5".to_string(),
        });
        rules.push(MockRule::SubstringClass {
            needles: vec!["rows".to_string(), "cols".to_string()],
            value: ClassValue::Fixed("5".to_string()),
        });
        rules.push(MockRule::SubstringClass {
            needles: vec![
                "name".to_string(),
                "comment".to_string(),
                "text".to_string(),
                "material".to_string(),
                "family".to_string(),
                "type".to_string(),
                "prefix".to_string(),
                "path".to_string(),
                "label".to_string(),
            ],
            value: ClassValue::QuotedName,
        });
        // Measure-shaped names default to a float.
        rules.push(MockRule::SuffixClass {
            suffixes: vec![
                "_m".to_string(),
                "_mm".to_string(),
                "_cm".to_string(),
                "_inch".to_string(),
                "_degrees".to_string(),
            ],
            literal: "1.0".to_string(),
        });

        Self::new(rules)
    }
}
