//! Form parameter binding.
//!
//! Actions copy request parameters into their own fields in
//! [`Action::bind`](crate::action::Action::bind). [`FormValues`] offers typed
//! lookups over the parsed form; a value that is missing or does not convert
//! leaves the target field untouched.
//!
//! ```
//! use xweb_actions::binding::FormValues;
//! use xweb_http::QueryDict;
//!
//! let form = QueryDict::parse("page=3&tag=a&tag=b&draft=true&limit=lots");
//! let values = FormValues::new(&form);
//!
//! let mut page = 1_u32;
//! let mut tags: Vec<String> = Vec::new();
//! let mut limit = 10_usize;
//! assert!(values.bind("page", &mut page));
//! assert!(values.bind("tag", &mut tags));
//! assert!(!values.bind("limit", &mut limit));
//!
//! assert_eq!(page, 3);
//! assert_eq!(tags, vec!["a", "b"]);
//! assert_eq!(limit, 10);
//! ```

use xweb_http::QueryDict;

/// Conversion from the raw form values recorded for one name.
///
/// Scalars read the first value; sequences convert every value and fail as a
/// whole if any element fails.
pub trait FromFormValue: Sized {
    /// Converts `values` (never empty) into `Self`.
    fn from_form_values(values: &[String]) -> Option<Self>;
}

impl FromFormValue for String {
    fn from_form_values(values: &[String]) -> Option<Self> {
        values.first().cloned()
    }
}

impl FromFormValue for bool {
    fn from_form_values(values: &[String]) -> Option<Self> {
        match values.first()?.trim() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" | "on" => Some(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" | "off" => Some(false),
            _ => None,
        }
    }
}

macro_rules! impl_from_form_value_parse {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromFormValue for $ty {
                fn from_form_values(values: &[String]) -> Option<Self> {
                    values.first()?.trim().parse().ok()
                }
            }
        )*
    };
}

impl_from_form_value_parse!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: FromFormValue> FromFormValue for Vec<T> {
    fn from_form_values(values: &[String]) -> Option<Self> {
        values
            .iter()
            .map(|v| T::from_form_values(std::slice::from_ref(v)))
            .collect()
    }
}

/// Read-only view of the parsed form used during binding.
#[derive(Debug, Clone, Copy)]
pub struct FormValues<'a> {
    form: &'a QueryDict,
}

impl<'a> FormValues<'a> {
    /// Wraps a parsed form.
    pub const fn new(form: &'a QueryDict) -> Self {
        Self { form }
    }

    /// Returns the first raw value for `name`.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.form.get(name)
    }

    /// Returns `true` if the form has a value for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.form.contains_key(name)
    }

    /// Converts the values for `name`.
    pub fn value<T: FromFormValue>(&self, name: &str) -> Option<T> {
        let values = self.form.get_list(name).filter(|v| !v.is_empty())?;
        T::from_form_values(values)
    }

    /// Converts the values for `name` into `target`.
    ///
    /// Returns `false` and leaves `target` as it was when the name is absent
    /// or the conversion fails.
    pub fn bind<T: FromFormValue>(&self, name: &str, target: &mut T) -> bool {
        match self.value(name) {
            Some(value) => {
                *target = value;
                true
            }
            None => {
                if self.contains(name) {
                    tracing::debug!(field = name, "form value does not convert, keeping default");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> QueryDict {
        QueryDict::parse(input)
    }

    #[test]
    fn test_string_takes_first() {
        let form = values("name=ann&name=bob");
        assert_eq!(
            FormValues::new(&form).value::<String>("name").as_deref(),
            Some("ann")
        );
    }

    #[test]
    fn test_numeric_parse() {
        let form = values("a=42&b=-7&c=2.5&d=x");
        let v = FormValues::new(&form);
        assert_eq!(v.value::<u32>("a"), Some(42));
        assert_eq!(v.value::<i64>("b"), Some(-7));
        assert_eq!(v.value::<f64>("c"), Some(2.5));
        assert_eq!(v.value::<i32>("d"), None);
        assert_eq!(v.value::<u8>("b"), None);
    }

    #[test]
    fn test_bool_parse() {
        let form = values("a=true&b=0&c=on&d=maybe");
        let v = FormValues::new(&form);
        assert_eq!(v.value::<bool>("a"), Some(true));
        assert_eq!(v.value::<bool>("b"), Some(false));
        assert_eq!(v.value::<bool>("c"), Some(true));
        assert_eq!(v.value::<bool>("d"), None);
    }

    #[test]
    fn test_vec_all_or_nothing() {
        let form = values("ids=1&ids=2&bad=1&bad=x");
        let v = FormValues::new(&form);
        assert_eq!(v.value::<Vec<u16>>("ids"), Some(vec![1, 2]));
        assert_eq!(v.value::<Vec<u16>>("bad"), None);
    }

    #[test]
    fn test_bind_missing_keeps_default() {
        let form = values("");
        let mut count = 5_i32;
        assert!(!FormValues::new(&form).bind("count", &mut count));
        assert_eq!(count, 5);
    }

    #[test]
    fn test_bind_mismatch_keeps_default() {
        let form = values("count=many");
        let mut count = 5_i32;
        assert!(!FormValues::new(&form).bind("count", &mut count));
        assert_eq!(count, 5);
    }

    #[test]
    fn test_get_raw() {
        let form = values("q=hello+world");
        assert_eq!(FormValues::new(&form).get("q"), Some("hello world"));
        assert!(FormValues::new(&form).contains("q"));
    }
}
