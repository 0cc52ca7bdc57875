//! Value-semantic polymorphism with a capability table.
//!
//! This example demonstrates:
//! 1. Declaring a table with `capability_table!`
//! 2. Storing different animals in the same type, on the heap or inline
//! 3. Copying a table and changing the copy independently
//! 4. Replacing the held value with `set`

use clutch::prelude::*;

trait Animal {
    fn talk(&self) -> String;
    fn rename(&mut self, name: String);
}

#[derive(Clone)]
struct Cat;

impl Animal for Cat {
    fn talk(&self) -> String {
        "Meow".to_string()
    }

    fn rename(&mut self, _name: String) {
        // Cats ignore their names anyway
    }
}

#[derive(Clone)]
struct Dog {
    name: String,
}

impl Animal for Dog {
    fn talk(&self) -> String {
        format!("Vau, I am {}", self.name)
    }

    fn rename(&mut self, name: String) {
        self.name = name;
    }
}

capability_table! {
    /// Any animal, with value semantics.
    struct AnyAnimal: Animal {
        fn talk(&self) -> String;
        fn rename(&mut self, name: String);
    }
}

fn main() {
    // Heap storage works for any type
    let zoo: Vec<AnyAnimal> = vec![
        AnyAnimal::new(Cat),
        AnyAnimal::new(Dog {
            name: "Rex".to_string(),
        }),
    ];
    for animal in &zoo {
        println!("{}", animal.talk());
    }

    // Inline storage keeps the value inside the table, without allocating it
    // separately
    let mut dog: AnyAnimal<DefaultInline> = AnyAnimal::new(Dog {
        name: "Fido".to_string(),
    });
    let original = dog.clone();
    dog.rename("Bello".to_string());
    println!("copy: {}", dog.talk());
    println!("original: {}", original.talk());

    // Assigning a new value rebinds every operation
    dog.set(Cat);
    println!("after set: {}", dog.talk());
    println!("{dog:?}");
}
