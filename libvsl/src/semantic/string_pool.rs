use std::ops::Index;

/// Literal text in discovery order. Indices are never reused and identical
/// text is stored once per occurrence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: String) -> usize {
        let index = self.strings.len();
        trace!("string [{}] = {:?}", index, text);
        self.strings.push(text);
        index
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|text| text.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.strings.iter().map(|text| text.as_str()).enumerate()
    }
}

impl Index<usize> for StringPool {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.strings[index]
    }
}

#[test]
fn test_append_assigns_discovery_order() {
    let mut pool = StringPool::new();
    assert_eq!(pool.append("hi".to_string()), 0);
    assert_eq!(pool.append("hi".to_string()), 1);
    assert_eq!(pool.append("bye".to_string()), 2);
    assert_eq!(pool.len(), 3);
    assert_eq!(&pool[1], "hi");
    assert_eq!(pool.get(2), Some("bye"));
    assert_eq!(pool.get(3), None);
}

#[test]
fn test_iter_pairs_index_and_text() {
    let mut pool = StringPool::new();
    pool.append("a".to_string());
    pool.append("b".to_string());
    let pairs: Vec<(usize, &str)> = pool.iter().collect();
    assert_eq!(pairs, vec![(0, "a"), (1, "b")]);
}
