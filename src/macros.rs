//! Literal construction macro.
//!
//! [`vpack!`] drives a [`crate::Builder`] from a JSON-like literal and returns
//! `Result<Buffer, VPackError>`.
//!
//! Object key rules (same ergonomics as `serde_json::json!`):
//! - `{ a: 1 }` uses the literal key `"a"` (identifier stringized)
//! - `{ "a": 1 }` uses the literal string key `"a"`
//! - `{ (k): 1 }` uses the expression `k` as the key (anything `AsRef<str>`)
//!
//! Values are single token trees: literals, identifiers, nested `[...]`/`{...}`, or a
//! parenthesized expression such as `(-1)` or `(x + 1)`. Anything else is passed to
//! [`crate::Builder::add`] and must convert into [`crate::Value`].

/// Build a [`crate::Buffer`] from a JSON-like literal.
///
/// ```
/// # use vpack::vpack;
/// let name = "dynamic";
/// let buf = vpack!({
///     a: 1,
///     "b": [true, null, 1.5, (-3)],
///     (name): { nested: "yes" },
/// })?;
/// assert_eq!(buf.slice().length()?, 3);
/// # Ok::<(), vpack::VPackError>(())
/// ```
#[macro_export]
macro_rules! vpack {
    ($($value:tt)+) => {{
        (|| -> ::core::result::Result<$crate::Buffer, $crate::VPackError> {
            let mut builder = $crate::Builder::new();
            $crate::__vpack_add!(builder, $($value)+);
            builder.finish()
        })()
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vpack_add {
    ($b:ident, null) => {
        $b.add(())?;
    };
    ($b:ident, true) => {
        $b.add(true)?;
    };
    ($b:ident, false) => {
        $b.add(false)?;
    };
    ($b:ident, [ $($elem:tt),* $(,)? ]) => {
        $b.open_array()?;
        $( $crate::__vpack_add!($b, $elem); )*
        $b.close()?;
    };
    ($b:ident, { $($key:tt : $value:tt),* $(,)? }) => {
        $b.open_object()?;
        $(
            $b.add_key($crate::__vpack_key!($key))?;
            $crate::__vpack_add!($b, $value);
        )*
        $b.close()?;
    };
    ($b:ident, $other:expr) => {
        $b.add($other)?;
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __vpack_key {
    ($key:ident) => {
        ::core::stringify!($key)
    };
    (($key:expr)) => {
        ::core::convert::AsRef::<str>::as_ref(&$key)
    };
    ($key:literal) => {
        $key
    };
}
