#[macro_export]
macro_rules! hresult_mapping {
    (
        $objectname:ident,
        $(
            $(#[$docs:meta])*
            ($phrase:ident, $code:literal, $message:literal);
        )+
    ) => {
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
        #[allow(non_upper_case_globals)]
        #[allow(non_camel_case_types)]
        pub enum $objectname {
            $(
                $(#[$docs])*
                $phrase,
            )+
        }

        impl $objectname {
            /// The 32-bit HRESULT value.
            pub fn code(&self) -> u32 {
                match self {
                    $(
                        Self::$phrase => $code,
                    )+
                }
            }

            /// System message text for the code.
            pub fn message(&self) -> &'static str {
                match self {
                    $(
                        Self::$phrase => $message,
                    )+
                }
            }
        }

        impl std::fmt::Display for $objectname {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$phrase => f.write_str(stringify!($phrase)),
                    )+
                }
            }
        }

        #[allow(unreachable_patterns)]
        pub fn get_obj_by_code(code: u32) -> Option<$objectname> {
            match code {
                $(
                    $code => Some($objectname::$phrase),
                )+
                _ => None
            }
        }
    }
}
