// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! svec {
    // Vec<String> from anything String: From
    ($($item:expr),* $(,)?) => {
        ::std::vec![$(::std::string::String::from($item)),*]
    };
}
