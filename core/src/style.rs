//! Enumerated style constants that documents refer to by name.
//!
//! Every domain is a hand-maintained table of `(name, value)` pairs. Name lookup is an exhaustive
//! search of that table, so a name resolves if and only if it is listed.

use core::fmt;

/// An enumerated style domain with a finite table of named values.
pub trait StyleConstant: Copy + Sized + 'static {
    /// All values of this domain and their names, in declaration order.
    const TABLE: &'static [(&'static str, Self)];

    /// Resolves a name against the table.
    fn from_name(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

/// Declares a style constant enum along with its name table.
///
/// The first variant is the default.
///
/// ```text
/// style_constants! {
///     /// Docs.
///     Name {
///         Variant = "DocumentName",
///         ...
///     }
/// }
/// ```
#[macro_export]
macro_rules! style_constants {
    (
        $(#[$attr:meta])*
        $name:ident {
            $first:ident = $first_str:literal,
            $($variant:ident = $str:literal,)*
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $first,
            $($variant,)*
        }

        impl $crate::style::StyleConstant for $name {
            const TABLE: &'static [(&'static str, Self)] = &[
                ($first_str, $name::$first),
                $(($str, $name::$variant),)*
            ];
        }

        impl $name {
            /// Returns the name of this value as it appears in documents.
            pub fn name(self) -> &'static str {
                match self {
                    $name::$first => $first_str,
                    $($name::$variant => $str,)*
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

style_constants! {
    /// Main axis of a linear layout.
    Axis {
        Horizontal = "Horizontal",
        Vertical = "Vertical",
    }
}

style_constants! {
    /// Distribution of leftover space in a flex layout.
    Spacing {
        SpaceEnd = "SpaceEnd",
        SpaceStart = "SpaceStart",
        SpaceSides = "SpaceSides",
        SpaceAround = "SpaceAround",
        SpaceBetween = "SpaceBetween",
        SpaceEvenly = "SpaceEvenly",
    }
}

style_constants! {
    /// Cross-axis alignment.
    Alignment {
        Start = "Start",
        End = "End",
        Middle = "Middle",
        Baseline = "Baseline",
    }
}

style_constants! {
    /// Horizontal text alignment.
    TextAlignment {
        Start = "Start",
        End = "End",
        Middle = "Middle",
    }
}

style_constants! {
    FontStyle {
        Regular = "Regular",
        Italic = "Italic",
    }
}

style_constants! {
    FontWeight {
        Normal = "Normal",
        Thin = "Thin",
        ExtraLight = "ExtraLight",
        Light = "Light",
        Medium = "Medium",
        SemiBold = "SemiBold",
        Bold = "Bold",
        ExtraBold = "ExtraBold",
        Black = "Black",
    }
}

style_constants! {
    /// Line wrapping strategy for text.
    WrapPolicy {
        WrapHeuristically = "WrapHeuristically",
        WrapWords = "WrapWords",
        WrapGraphemes = "WrapGraphemes",
    }
}

style_constants! {
    /// Typographic preset of a label.
    LabelFormat {
        Text = "Text",
        H1 = "H1",
        H2 = "H2",
        H3 = "H3",
        H4 = "H4",
        H5 = "H5",
        H6 = "H6",
        Subtitle1 = "Subtitle1",
        Subtitle2 = "Subtitle2",
        Body1 = "Body1",
        Body2 = "Body2",
        Caption = "Caption",
        Overline = "Overline",
    }
}

impl LabelFormat {
    /// Text size in points for this preset.
    pub fn text_size(self) -> f64 {
        match self {
            LabelFormat::H1 => 96.,
            LabelFormat::H2 => 60.,
            LabelFormat::H3 => 48.,
            LabelFormat::H4 => 34.,
            LabelFormat::H5 => 24.,
            LabelFormat::H6 => 20.,
            LabelFormat::Subtitle1 => 16.,
            LabelFormat::Subtitle2 => 14.,
            LabelFormat::Body1 => 16.,
            LabelFormat::Body2 => 14.,
            LabelFormat::Caption => 12.,
            LabelFormat::Overline => 10.,
            LabelFormat::Text => 16.,
        }
    }
}

style_constants! {
    /// Kind of text an input expects.
    InputType {
        Any = "Any",
        Text = "Text",
        Numeric = "Numeric",
        Integer = "Integer",
        Email = "Email",
        Url = "URL",
        Telephone = "Telephone",
        Password = "Password",
    }
}

const EMAIL_CHARS: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-_~!#$%&'./=^`{}|@";
const URL_CHARS: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*_~!?#$%&'.:,;/=()[]@";

impl InputType {
    /// Character used to mask input, if any.
    pub fn default_mask(self) -> Option<char> {
        match self {
            InputType::Password => Some('*'),
            _ => None,
        }
    }

    /// The set of characters accepted for this input type. An empty filter accepts everything.
    pub fn default_filter(self) -> &'static str {
        match self {
            InputType::Numeric => "0123456789.-",
            InputType::Integer => "0123456789-",
            InputType::Email => EMAIL_CHARS,
            InputType::Url => URL_CHARS,
            InputType::Telephone => "0123456789-./ ()+",
            _ => "",
        }
    }

    /// The filter for the next typed character, given the text so far.
    ///
    /// Characters that may only appear once (or only at the start) are removed once used.
    pub fn adjusted_filter(self, text: &str) -> String {
        let mut filter = self.default_filter().to_string();
        if text.is_empty() {
            return filter;
        }
        let remove = |filter: &mut String, c: char| {
            if let Some(pos) = filter.find(c) {
                filter.remove(pos);
            }
        };
        match self {
            InputType::Numeric => {
                remove(&mut filter, '-');
                if text.contains('.') {
                    remove(&mut filter, '.');
                }
            }
            InputType::Integer => remove(&mut filter, '-'),
            InputType::Email if text.contains('@') => remove(&mut filter, '@'),
            InputType::Url if text.contains('?') => remove(&mut filter, '?'),
            InputType::Telephone => {
                remove(&mut filter, '+');
                for c in ['(', ')'] {
                    if text.contains(c) {
                        remove(&mut filter, c);
                    }
                }
            }
            _ => (),
        }
        filter
    }
}

/// Helper for displaying a style constant table in error messages.
pub struct TableNames<S: StyleConstant>(core::marker::PhantomData<S>);

impl<S: StyleConstant> TableNames<S> {
    pub fn new() -> Self {
        TableNames(core::marker::PhantomData)
    }
}

impl<S: StyleConstant> Default for TableNames<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StyleConstant> fmt::Display for TableNames<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (name, _)) in S::TABLE.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
