//! Builds a list of text payloads, prints it, and removes entries one at a time.
//!
//! Run with `RUST_LOG=trace` to see the list's own diagnostics.

use knitlist::{List, ListError};

/// The payloads pushed by the demo. The last one keeps its C string terminator.
const TEXTS: [&[u8]; 5] = [b"Hello", b"world", b"Some", b"string", b"Another text for linked list\0"];

fn build_list() -> Result<List, ListError> {
    let mut list = List::new();
    for text in TEXTS {
        list.push(text)?;
    }
    Ok(list)
}

fn print_list(list: &List) {
    for (idx, link) in list.iter().enumerate() {
        println!("Link {}: {} bytes: {:?}", idx, link.len(), String::from_utf8_lossy(&link));
    }
    println!();
}

fn main() -> Result<(), ListError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut list = build_list()?;
    print_list(&list);

    for index in [4, 0, 1] {
        list.remove(index)?;
        print_list(&list);
    }

    // rejected and logged, the list is left alone
    if let Err(err) = list.remove(7) {
        println!("remove(7): {}", err);
    }

    drop(list);
    Ok(())
}
