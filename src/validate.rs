use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Accepted,
    Rejected { recommend: Option<String> },
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted)
    }
}

// Editor-facing input checks for numeric and text fields. Run as an
// ordered list; the first rejection wins.
#[derive(Debug, Clone)]
pub enum Validator {
    MinMax { min: Option<f64>, max: Option<f64> },
    Pattern(Regex),
}

impl Validator {
    pub fn check(&self, input: &str) -> Validation {
        match self {
            Validator::MinMax { min, max } => {
                let Ok(value) = input.trim().parse::<f64>() else {
                    return Validation::Rejected { recommend: None };
                };
                if let Some(min) = min {
                    if value < *min {
                        return Validation::Rejected {
                            recommend: Some(format!("{}", min)),
                        };
                    }
                }
                if let Some(max) = max {
                    if value > *max {
                        return Validation::Rejected {
                            recommend: Some(format!("{}", max)),
                        };
                    }
                }
                Validation::Accepted
            }
            Validator::Pattern(pattern) => {
                if pattern.is_match(input) {
                    Validation::Accepted
                } else {
                    Validation::Rejected { recommend: None }
                }
            }
        }
    }
}

pub fn run_validators(validators: &[Validator], input: &str) -> Validation {
    for validator in validators {
        let result = validator.check(input);
        if !result.is_accepted() {
            return result;
        }
    }
    Validation::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal_field() -> Vec<Validator> {
        vec![
            Validator::Pattern(Regex::new(r"^-?\d+(\.\d+)?$").unwrap()),
            Validator::MinMax {
                min: Some(0.0),
                max: Some(100.0),
            },
        ]
    }

    #[test]
    fn in_range_numbers_pass() {
        assert_eq!(run_validators(&decimal_field(), "42.5"), Validation::Accepted);
        assert_eq!(run_validators(&decimal_field(), "0"), Validation::Accepted);
    }

    #[test]
    fn out_of_range_recommends_the_clamped_bound() {
        assert_eq!(
            run_validators(&decimal_field(), "150"),
            Validation::Rejected {
                recommend: Some("100".to_string())
            }
        );
        assert_eq!(
            run_validators(&decimal_field(), "-3"),
            Validation::Rejected {
                recommend: Some("0".to_string())
            }
        );
    }

    #[test]
    fn first_rejection_wins() {
        // "abc" fails the pattern before MinMax ever parses it, so no
        // recommendation comes back.
        assert_eq!(
            run_validators(&decimal_field(), "abc"),
            Validation::Rejected { recommend: None }
        );
    }

    #[test]
    fn empty_validator_list_accepts() {
        assert_eq!(run_validators(&[], "anything"), Validation::Accepted);
    }
}
