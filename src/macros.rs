#[macro_export]
macro_rules! node_class {
    // Class without parameters
    ($vis:vis $ident:ident, $name:expr, $tag:expr) => {
        $crate::node_class!($vis $ident, $name, $tag, []);
    };

    // Class with a parameter table
    ($vis:vis $ident:ident, $name:expr, $tag:expr, [ $($param:expr),* $(,)? ]) => {
        $vis static $ident: $crate::NodeClass = $crate::NodeClass {
            name: $name,
            tag: $crate::NodeTag::new(*$tag),
            params: &[$($param),*],
        };
    };
}
