use std::collections::{HashMap, HashSet};

/// A named group of observed identifiers (a genome, contig, or whole sample)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,

    /// Distinct identifiers in first-seen order
    pub identifiers: Vec<String>,

    seen: HashSet<String>,
}

impl Sample {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifiers: Vec::new(),
            seen: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(identifiers);
        self
    }

    /// Add identifiers, dropping blanks and duplicates
    pub fn extend<I, S>(&mut self, identifiers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in identifiers {
            let id: String = id.into();
            let id = id.trim();
            if id.is_empty() || self.seen.contains(id) {
                continue;
            }
            self.seen.insert(id.to_string());
            self.identifiers.push(id.to_string());
        }
    }

    /// Observed set used for scoring
    #[must_use]
    pub fn observed(&self) -> HashSet<String> {
        self.identifiers.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Samples in input order, merged by name
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
    name_to_index: HashMap<String, usize>,
}

impl SampleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add identifiers to the sample called `name`, creating it if needed
    pub fn add<I, S>(&mut self, name: &str, identifiers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = match self.name_to_index.get(name) {
            Some(&i) => i,
            None => {
                self.samples.push(Sample::new(name));
                self.name_to_index
                    .insert(name.to_string(), self.samples.len() - 1);
                self.samples.len() - 1
            }
        };
        self.samples[index].extend(identifiers);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Sample> {
        self.name_to_index.get(name).map(|&i| &self.samples[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// One sample holding the union of every sample's identifiers
    #[must_use]
    pub fn union(&self, name: &str) -> Sample {
        let mut all = Sample::new(name);
        for sample in &self.samples {
            all.extend(sample.identifiers.iter().cloned());
        }
        all
    }

    /// Total distinct identifiers across samples
    #[must_use]
    pub fn identifier_count(&self) -> usize {
        self.union("").len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
