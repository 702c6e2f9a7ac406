/// Builds a field list for the print calls.
///
/// ```
/// use scopelog::{fields, Value};
///
/// let list: Vec<Value> = fields!["user", "ada", "attempts", 3];
/// assert_eq!(list.len(), 4);
///
/// let pairs: Vec<Value> = fields!{"user" => "ada", "attempts" => 3};
/// assert_eq!(list, pairs);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($key), $crate::Value::from($value)),+]
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
