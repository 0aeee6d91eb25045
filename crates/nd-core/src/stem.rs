//! Porter stemmer over lowercase ASCII words.
//!
//! Words containing anything other than `a-z`, or of length <= 2, are
//! returned unchanged.

/// Stem a single lowercase word.
pub fn stem(word: &str) -> String {
    if word.len() <= 2 || !word.bytes().all(|c| c.is_ascii_lowercase()) {
        return word.to_string();
    }
    let mut w = Word {
        b: word.as_bytes().to_vec(),
    };
    w.step1a();
    w.step1b();
    w.step1c();
    w.step2();
    w.step3();
    w.step4();
    w.step5a();
    w.step5b();
    w.b.into_iter().map(char::from).collect()
}

struct Word {
    b: Vec<u8>,
}

const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

impl Word {
    fn len(&self) -> usize {
        self.b.len()
    }

    fn is_consonant(&self, i: usize) -> bool {
        match self.b[i] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.is_consonant(i - 1),
            _ => true,
        }
    }

    /// Number of VC sequences in the first `len` letters.
    fn measure(&self, len: usize) -> usize {
        let mut n = 0;
        let mut i = 0;
        while i < len && self.is_consonant(i) {
            i += 1;
        }
        loop {
            while i < len && !self.is_consonant(i) {
                i += 1;
            }
            if i >= len {
                return n;
            }
            while i < len && self.is_consonant(i) {
                i += 1;
            }
            n += 1;
            if i >= len {
                return n;
            }
        }
    }

    fn has_vowel(&self, len: usize) -> bool {
        (0..len).any(|i| !self.is_consonant(i))
    }

    fn ends_double_consonant(&self, len: usize) -> bool {
        len >= 2 && self.b[len - 1] == self.b[len - 2] && self.is_consonant(len - 1)
    }

    /// consonant-vowel-consonant ending where the last consonant is not w, x or y.
    fn ends_cvc(&self, len: usize) -> bool {
        len >= 3
            && self.is_consonant(len - 3)
            && !self.is_consonant(len - 2)
            && self.is_consonant(len - 1)
            && !matches!(self.b[len - 1], b'w' | b'x' | b'y')
    }

    fn ends_with(&self, suffix: &str) -> bool {
        self.b.ends_with(suffix.as_bytes())
    }

    fn replace_suffix(&mut self, suffix_len: usize, replacement: &str) {
        let keep = self.len() - suffix_len;
        self.b.truncate(keep);
        self.b.extend_from_slice(replacement.as_bytes());
    }

    /// Apply the first rule whose suffix matches, if the stem measure exceeds `min_m`.
    fn apply_rules(&mut self, rules: &[(&str, &str)], min_m: usize) {
        if let Some((suffix, replacement)) = rules.iter().find(|(s, _)| self.ends_with(s)) {
            let stem_len = self.len() - suffix.len();
            if self.measure(stem_len) > min_m {
                self.replace_suffix(suffix.len(), replacement);
            }
        }
    }

    fn step1a(&mut self) {
        if self.ends_with("sses") || self.ends_with("ies") {
            self.replace_suffix(2, "");
        } else if self.ends_with("s") && !self.ends_with("ss") {
            self.replace_suffix(1, "");
        }
    }

    fn step1b(&mut self) {
        if self.ends_with("eed") {
            if self.measure(self.len() - 3) > 0 {
                self.replace_suffix(1, "");
            }
            return;
        }

        let suffix_len = if self.ends_with("ed") && self.has_vowel(self.len() - 2) {
            2
        } else if self.ends_with("ing") && self.has_vowel(self.len() - 3) {
            3
        } else {
            return;
        };
        self.replace_suffix(suffix_len, "");

        let len = self.len();
        if self.ends_with("at") || self.ends_with("bl") || self.ends_with("iz") {
            self.b.push(b'e');
        } else if self.ends_double_consonant(len) && !matches!(self.b[len - 1], b'l' | b's' | b'z')
        {
            self.b.pop();
        } else if self.measure(len) == 1 && self.ends_cvc(len) {
            self.b.push(b'e');
        }
    }

    fn step1c(&mut self) {
        let len = self.len();
        if self.ends_with("y") && self.has_vowel(len - 1) {
            self.b[len - 1] = b'i';
        }
    }

    fn step2(&mut self) {
        self.apply_rules(STEP2, 0);
    }

    fn step3(&mut self) {
        self.apply_rules(STEP3, 0);
    }

    fn step4(&mut self) {
        let Some(suffix) = STEP4.iter().find(|s| self.ends_with(s)) else {
            return;
        };
        let stem_len = self.len() - suffix.len();
        if *suffix == "ion" && !(stem_len > 0 && matches!(self.b[stem_len - 1], b's' | b't')) {
            return;
        }
        if self.measure(stem_len) > 1 {
            self.b.truncate(stem_len);
        }
    }

    fn step5a(&mut self) {
        if !self.ends_with("e") {
            return;
        }
        let stem_len = self.len() - 1;
        let m = self.measure(stem_len);
        if m > 1 || (m == 1 && !self.ends_cvc(stem_len)) {
            self.b.truncate(stem_len);
        }
    }

    fn step5b(&mut self) {
        let len = self.len();
        if self.measure(len) > 1 && self.ends_double_consonant(len) && self.b[len - 1] == b'l' {
            self.b.pop();
        }
    }
}
