//! Tuple decomposition into leading, variadic and trailing segments.
//!
//! Elements before (and including) the variadic one are addressed from the
//! front, elements after it from the back, so a runtime check can slice an
//! array of unknown length.
use crate::error::Error;
use crate::model::{TupleElement, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// `ordinal >= 0` counts from the front, `< 0` from the back.
    Fixed { ordinal: isize },
    /// The spread segment `data.slice(from, to)`; `to == None` runs to the end.
    Variadic { from: usize, to: Option<isize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleSlot {
    pub ty: TypeId,
    pub kind: SlotKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleLayout {
    pub slots: Vec<TupleSlot>,
    /// Number of always-present elements.
    pub min_length: usize,
}

pub fn decompose(elements: &[TupleElement], text: &str) -> Result<TupleLayout, Error> {
    let n = elements.len() as isize;
    let mut variadic_at: Option<usize> = None;
    let mut slots = Vec::with_capacity(elements.len());

    for (i, element) in elements.iter().enumerate() {
        let kind = if element.variadic {
            if variadic_at.is_some() {
                return Err(Error::MultipleVariadic { text: text.to_string() });
            }
            variadic_at = Some(i);
            let to = if i as isize == n - 1 { None } else { Some(i as isize - (n - 1)) };
            SlotKind::Variadic { from: i, to }
        } else {
            let ordinal = match variadic_at {
                None => i as isize,
                Some(_) => i as isize - n,
            };
            SlotKind::Fixed { ordinal }
        };
        slots.push(TupleSlot { ty: element.ty, kind });
    }

    let min_length = elements.iter().filter(|e| !e.variadic).count();
    Ok(TupleLayout { slots, min_length })
}

/// `data[0]`, or `data[data.length - 2]` for back-relative ordinals.
pub fn element_access(data: &str, ordinal: isize) -> String {
    if ordinal >= 0 {
        format!("{data}[{ordinal}]")
    } else {
        format!("{data}[{data}.length - {}]", -ordinal)
    }
}

/// `data.slice(1)` or `data.slice(1, -2)`.
pub fn slice_expression(data: &str, from: usize, to: Option<isize>) -> String {
    match to {
        None => format!("{data}.slice({from})"),
        Some(to) => format!("{data}.slice({from}, {to})"),
    }
}

/// Human-readable issue path for a slot, e.g. `0`, `-1` or `"1..-1"`.
pub fn slot_path(kind: SlotKind) -> String {
    match kind {
        SlotKind::Fixed { ordinal } => ordinal.to_string(),
        SlotKind::Variadic { from, to: None } => format!("\"{from}..\""),
        SlotKind::Variadic { from, to: Some(to) } => format!("\"{from}..{to}\""),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn elems(pattern: &[bool]) -> Vec<TupleElement> {
        pattern.iter()
            .enumerate()
            .map(|(i, &variadic)| TupleElement { ty: TypeId(i as u32), variadic })
            .collect()
    }

    fn ordinals(layout: &TupleLayout) -> Vec<isize> {
        layout
            .slots
            .iter()
            .filter_map(|s| match s.kind {
                SlotKind::Fixed { ordinal } => Some(ordinal),
                SlotKind::Variadic { .. } => None,
            })
            .collect()
    }

    #[test]
    fn leading_and_trailing_ordinals() {
        // [A, B, ...C[], D, E, F]
        let layout = decompose(&elems(&[false, false, true, false, false, false]), "t").unwrap();
        assert_eq!(ordinals(&layout), vec![0, 1, -3, -2, -1]);
        assert_eq!(layout.min_length, 5);
        assert_eq!(layout.slots[2].kind, SlotKind::Variadic { from: 2, to: Some(-3) });
    }

    #[test]
    fn every_split_point_obeys_the_ordinal_law() {
        for k in 0..4usize {
            for m in 0..4usize {
                let mut pattern = vec![false; k];
                pattern.push(true);
                pattern.extend(std::iter::repeat_n(false, m));
                let layout = decompose(&elems(&pattern), "t").unwrap();

                let expected: Vec<isize> = (0..k as isize).chain(-(m as isize)..0).collect();
                assert_eq!(ordinals(&layout), expected, "k={k} m={m}");
                assert_eq!(layout.min_length, k + m);

                let to = if m == 0 { None } else { Some(-(m as isize)) };
                assert_eq!(layout.slots[k].kind, SlotKind::Variadic { from: k, to });
            }
        }
    }

    #[test]
    fn fixed_tuple_counts_forward() {
        let layout = decompose(&elems(&[false, false]), "t").unwrap();
        assert_eq!(ordinals(&layout), vec![0, 1]);
        assert_eq!(layout.min_length, 2);
    }

    #[test]
    fn two_variadic_elements_are_rejected() {
        let err = decompose(&elems(&[true, false, true]), "[...A[], B, ...C[]]").unwrap_err();
        assert!(matches!(err, Error::MultipleVariadic { .. }));
    }

    #[test]
    fn access_and_slice_expressions() {
        assert_eq!(element_access("data", 0), "data[0]");
        assert_eq!(element_access("data", -1), "data[data.length - 1]");
        assert_eq!(slice_expression("data", 2, None), "data.slice(2)");
        assert_eq!(slice_expression("data", 1, Some(-2)), "data.slice(1, -2)");
        assert_eq!(slot_path(SlotKind::Variadic { from: 1, to: Some(-2) }), "\"1..-2\"");
    }
}
