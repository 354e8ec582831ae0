/// Arguments shared by get and scan requests.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ReadArgs {
    /// Whether the read must observe every write acknowledged before it.
    pub consistent_read: Option<bool>,
    /// The table to read from.
    pub table_name: String,
}

/// apply common read settings to a builder
#[macro_export]
#[doc(hidden)]
macro_rules! apply_read_operation {
    ($builder:expr, $read_args:expr) => {
        $builder
            .set_consistent_read($read_args.consistent_read)
            .table_name($read_args.table_name)
    };
}
