/// Build a [`Params`](crate::Params) map.
///
/// ```ignore
/// let p = params! { "name" => "Dima Zotov", "likesCount" => 1 };
/// let empty = params! {};
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Params::new()$(.set($name, $value))+
    };
}
