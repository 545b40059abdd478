/// Append `column = ?` to an UPDATE builder when the change is `Some`,
/// inserting a comma separator after the first pushed field.
macro_rules! push_update_field {
    ($builder:expr, $sep:expr, $column:expr, $value:expr) => {
        if let Some(value) = $value {
            if $sep {
                $builder.push(", ");
            }
            #[allow(unused_assignments)]
            {
                $sep = true;
            }
            $builder.push(concat!($column, " = "));
            $builder.push_bind(value);
        }
    };
}

pub(crate) use push_update_field;
