//! Closed vocabularies written as bare words in the data files.

/// Declares a fieldless enum whose variants are spelled by fixed keywords.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $word:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        $vis enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn from_keyword(word: &str) -> Option<$name> {
                match word {
                    $($word => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn keyword(self) -> &'static str {
                match self {
                    $($name::$variant => $word,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.keyword())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    keyword_enum! {
        enum Weather {
            Rain => "rain",
            SnowStorm => "snow_storm",
        }
    }

    #[test]
    fn test_keyword_round_trip() {
        for weather in Weather::ALL {
            assert_eq!(Weather::from_keyword(weather.keyword()), Some(*weather));
        }
        assert_eq!(Weather::from_keyword("Rain"), None);
        assert_eq!(Weather::SnowStorm.to_string(), "snow_storm");
    }
}
