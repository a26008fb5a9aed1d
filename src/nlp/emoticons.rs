// Emoticon table: facial expression classes with their polarity
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct EmoticonClass {
    pub name: &'static str,
    pub polarity: f64,
    pub forms: &'static [&'static str],
}

pub static EMOTICONS: Lazy<Vec<EmoticonClass>> = Lazy::new(|| {
    vec![
        EmoticonClass { name: "love", polarity: 1.00, forms: &["<3", "\u{2665}"] },
        EmoticonClass {
            name: "grin",
            polarity: 1.00,
            forms: &[">:D", ":-D", ":D", "=-D", "=D", "X-D", "x-D", "XD", "xD", "8-D"],
        },
        EmoticonClass {
            name: "taunt",
            polarity: 0.75,
            forms: &[">:P", ":-P", ":P", ":-p", ":p", ":-b", ":b", ":c)", ":o)", ":^)"],
        },
        EmoticonClass {
            name: "smile",
            polarity: 0.50,
            forms: &[">:)", ":-)", ":)", "=)", "=]", ":]", ":}", ":>", ":3", "8)", "8-)"],
        },
        EmoticonClass {
            name: "wink",
            polarity: 0.25,
            forms: &[">;]", ";-)", ";)", ";-]", ";]", ";D", ";^)", "*-)", "*)"],
        },
        EmoticonClass {
            name: "gasp",
            polarity: 0.05,
            forms: &[">:o", ":-O", ":O", ":o", ":-o", "o_O", "o.O", "\u{b0}O\u{b0}", "\u{b0}o\u{b0}"],
        },
        EmoticonClass {
            name: "worry",
            polarity: -0.25,
            forms: &[">:/", ":-/", ":/", ":\\", ">:\\", ":-.", ":-s", ":s", ":S", ":-S", ">.>"],
        },
        EmoticonClass {
            name: "frown",
            polarity: -0.75,
            forms: &[">:[", ":-(", ":(", "=(", ":-[", ":[", ":{", ":-<", ":c", ":-c", "=/"],
        },
        EmoticonClass { name: "cry", polarity: -1.00, forms: &[":'(", ":'''(", ";'("] },
    ]
});

impl EmoticonClass {
    pub fn matches(&self, token: &str) -> bool {
        self.forms.iter().any(|form| form.to_lowercase() == token.to_lowercase())
    }
}

/// Polarities of every emoticon class `token` belongs to, in table order.
pub fn polarities(token: &str) -> Vec<f64> {
    EMOTICONS
        .iter()
        .filter(|class| class.matches(token))
        .map(|class| class.polarity)
        .collect()
}

pub fn is_emoticon(token: &str) -> bool {
    EMOTICONS.iter().any(|class| class.matches(token))
}
