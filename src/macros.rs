/// Declares a `#[test]` whose body only runs when `$gate` can reach its dependency.
///
/// The body receives `&mut Invocation` and evaluates to `anyhow::Result<()>`.
#[macro_export]
macro_rules! gated_test {
    ($gate:expr, $(#[$meta:meta])* fn $name:ident($inv:ident) $body:block) => {
        $(#[$meta])*
        #[test]
        fn $name() {
            $crate::setup::setup_globals();
            let gate = $gate;
            let descriptor = $crate::gate::TestDescriptor::requires_redis(concat!(
                module_path!(),
                "::",
                stringify!($name)
            ));
            gate.run(&descriptor, |$inv| $body)
                .report(&descriptor.name);
        }
    };
}

/// `gated_test!` against Redis on the well-known port.
#[macro_export]
macro_rules! redis_available_test {
    ($(#[$meta:meta])* fn $name:ident($inv:ident) $body:block) => {
        $crate::gated_test!(
            $crate::gate::AvailabilityGate::redis(),
            $(#[$meta])* fn $name($inv) $body
        );
    };
}
