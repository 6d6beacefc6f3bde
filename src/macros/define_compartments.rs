/// Defines a compartment state type with the following parameters:
/// * `$name`: Name of the state struct. Every field is an `f64` population count.
/// * `$field => $label`: The field identifier and the stable column name used in tables.
/// * `cases`: The fields that count toward "ever infected" occupancy, i.e. the compartments an
///   individual only reaches after being infected.
///
/// ```
/// use epicensus::define_compartments;
///
/// define_compartments!(
///     /// Susceptible, infected, recovered.
///     MyState { s => "susceptible", i => "infected", r => "recovered" },
///     cases: [i, r]
/// );
/// ```
#[macro_export]
macro_rules! define_compartments {
    (
        $(#[$meta:meta])*
        $name:ident { $($field:ident => $label:literal),+ $(,)? },
        cases: [$($case:ident),+ $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name {
            $(pub $field: f64),+
        }

        impl $crate::compartments::Compartments for $name {
            const LABELS: &'static [&'static str] = &[$($label),+];

            fn values(&self) -> Vec<f64> {
                vec![$(self.$field),+]
            }

            fn map<F: FnMut(f64) -> f64>(self, mut f: F) -> Self {
                $name {
                    $($field: f(self.$field)),+
                }
            }

            fn total(&self) -> f64 {
                0.0 $(+ self.$field)+
            }

            fn cumulative_cases(&self) -> f64 {
                0.0 $(+ self.$case)+
            }
        }
    };
}
