/// lazy k-subsets of a slice in lexicographic index order.
///
/// finite, and restartable by cloning before iterating (or calling `restart`).
/// `k == 0` yields one empty subset; `k > len` yields nothing.
pub struct Combinations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

/// all `k`-element subsets of `items`, without repetition
pub fn combinations<T>(items: &[T], k: usize) -> Combinations<'_, T> {
    Combinations {
        items,
        indices: (0..k).collect(),
        started: false,
        done: k > items.len(),
    }
}

impl<'a, T> Clone for Combinations<'a, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items,
            indices: self.indices.clone(),
            started: self.started,
            done: self.done,
        }
    }
}

impl<'a, T> Combinations<'a, T> {
    pub fn restart(&mut self) {
        *self = combinations(self.items, self.indices.len());
    }

    fn advance(&mut self) -> bool {
        let (n, k) = (self.items.len(), self.indices.len());
        // rightmost slot that still has room to move
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < n - k + i) else {
            return false;
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.started {
            if !self.advance() {
                self.done = true;
                return None;
            }
        } else {
            self.started = true;
        }
        let items = self.items;
        Some(self.indices.iter().map(|&i| &items[i]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_subsets() {
        let items = [1, 2, 3, 4];
        let all: Vec<Vec<i32>> = combinations(&items, 2).map(|c| c.into_iter().copied().collect()).collect();
        assert_eq!(all, vec![vec![1, 2], vec![1, 3], vec![1, 4], vec![2, 3], vec![2, 4], vec![3, 4]]);
    }

    #[test]
    fn test_counts() {
        let items: Vec<u8> = (0..7).collect();
        assert_eq!(combinations(&items, 3).count(), 35);
        assert_eq!(combinations(&items, 7).count(), 1);
        assert_eq!(combinations(&items, 0).count(), 1);
        assert_eq!(combinations(&items, 8).count(), 0);
    }

    #[test]
    fn test_restartable() {
        let items = ['a', 'b', 'c'];
        let mut it = combinations(&items, 2);
        let snapshot = it.clone();
        assert_eq!(it.next(), Some(vec![&'a', &'b']));
        assert_eq!(it.by_ref().count(), 2);
        assert_eq!(it.next(), None);
        assert_eq!(snapshot.count(), 3);
        it.restart();
        assert_eq!(it.count(), 3);
    }
}
