#![no_main]

use knitlist::{List, ListError};

use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Actions {
    /// Push a copy of the bytes
    Push { bytes: Vec<u8> },
    /// Check the element at index against the model
    Get { index: u8 },
    /// Remove the element at index
    Remove { index: u8 },
    /// Move the element at from to to
    Reposition { from: u8, to: u8 },
    /// Replace the list with a deep copy of itself
    Duplicate,
    /// Drop every element
    Clear,
}
use Actions::*;

fuzz_target!(|actions: Vec<Actions>| fuzz_list(actions));

fn fuzz_list(actions: Vec<Actions>) {
    let mut list = List::new();
    let mut model: Vec<Vec<u8>> = vec![];

    for action in actions {
        match action {
            Push { bytes } => {
                list.push(&bytes).unwrap();
                model.push(bytes);
            }
            Get { index } => {
                let index = index as usize;
                match model.get(index) {
                    Some(expected) => assert_eq!(list.get(index).unwrap().as_bytes(), expected.as_slice()),
                    None => assert_eq!(
                        list.get(index),
                        Err(ListError::IndexError { index, len: model.len() })
                    ),
                }
            }
            Remove { index } => {
                let index = index as usize;
                if index < model.len() {
                    list.remove(index).unwrap();
                    model.remove(index);
                } else {
                    assert!(list.remove(index).is_err());
                }
            }
            Reposition { from, to } => {
                let (from, to) = (from as usize, to as usize);
                if from < model.len() && to < model.len() {
                    list.reposition(from, to).unwrap();
                    let item = model.remove(from);
                    model.insert(to, item);
                } else {
                    assert!(list.reposition(from, to).is_err());
                }
            }
            Duplicate => {
                let copy = list.try_clone().unwrap();
                assert_eq!(copy, list);
                list = copy;
            }
            Clear => {
                list.clear();
                model.clear();
            }
        }

        assert_eq!(list.len(), model.len());
        assert_eq!(list.counters().node_count, model.len());
    }

    assert!(list.iter().map(|link| link.as_bytes()).eq(model.iter().map(Vec::as_slice)));
}
