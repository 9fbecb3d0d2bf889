//! Helper macro for generating storage port error enums.
//!
//! Every variant carries a single `message` describing the underlying
//! failure, and gets a snake-case constructor accepting `impl Into<String>`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant {
                    /// Detail reported by the adapter.
                    message: String,
                },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    /// Construct this variant from an adapter-supplied detail.
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*

            /// Adapter-supplied detail, regardless of variant.
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message.as_str(), )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum ProbeError {
            Offline => "probe offline: {message}",
            Garbled => "probe garbled: {message}",
        }
    }

    #[test]
    fn constructors_accept_str_and_render_message() {
        let err = ProbeError::offline("disk unplugged");
        assert_eq!(err.to_string(), "probe offline: disk unplugged");
        assert_eq!(err.message(), "disk unplugged");
    }

    #[test]
    fn constructors_accept_owned_strings() {
        let err = ProbeError::garbled(String::from("bad json"));
        assert_eq!(
            err,
            ProbeError::Garbled {
                message: "bad json".to_owned()
            }
        );
    }
}
