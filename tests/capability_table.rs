//! Dispatch through tables generated by `capability_table!`.

use std::{cell::Cell, rc::Rc};

use clutch::{
    capability::{erase_owned, erase_ref},
    prelude::*,
    storage::Storage,
};

trait Talk {
    fn talk(&self) -> String;
    fn rename(&mut self, name: String);
    fn times(&self, count: usize, separator: char) -> String;
}

#[derive(Clone)]
struct Cat;

impl Talk for Cat {
    fn talk(&self) -> String {
        "Meow".to_string()
    }

    fn rename(&mut self, _name: String) {}

    fn times(&self, count: usize, separator: char) -> String {
        vec![self.talk(); count].join(&separator.to_string())
    }
}

#[derive(Clone)]
struct Dog {
    name: String,
}

impl Talk for Dog {
    fn talk(&self) -> String {
        format!("Vau, I am {}", self.name)
    }

    fn rename(&mut self, name: String) {
        self.name = name;
    }

    fn times(&self, count: usize, separator: char) -> String {
        vec!["Vau"; count].join(&separator.to_string())
    }
}

capability_table! {
    /// Something that talks.
    #[allow(dead_code)]
    pub struct Animal: Talk {
        fn talk(&self) -> String;
        /// Gives the animal a new name.
        fn rename(&mut self, name: String);
        fn times(&self, count: usize, separator: char) -> String;
    }
}

capability_table! {
    struct Speaker: Talk {
        fn talk(&self) -> String;
    }
}

trait Bump {
    fn bump(&self) -> u32;
}

#[derive(Clone, Default)]
struct Hits(Cell<u32>);

impl Bump for Hits {
    fn bump(&self) -> u32 {
        self.0.set(self.0.get() + 1);
        self.0.get()
    }
}

capability_table! {
    struct AnyBump: Bump {
        fn bump(&self) -> u32;
    }
}

mod single_letter_types {
    use clutch::prelude::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct T(pub u8);

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct R(pub u8);

    pub trait Combine {
        fn combine(&self, t: T) -> R;
    }

    #[derive(Clone)]
    pub struct Adder(pub u8);

    impl Combine for Adder {
        fn combine(&self, t: T) -> R {
            R(self.0 + t.0)
        }
    }

    capability_table! {
        pub struct AnyCombine: Combine {
            fn combine(&self, t: T) -> R;
        }
    }
}

#[test]
fn test_dispatch_reaches_the_held_type() {
    let cat: Animal = Animal::new(Cat);
    let dog: Animal<DefaultInline> = Animal::new(Dog {
        name: "Rex".to_string(),
    });

    assert_eq!(cat.talk(), "Meow");
    assert_eq!(dog.talk(), "Vau, I am Rex");
    assert_eq!(cat.times(3, '-'), "Meow-Meow-Meow");
    assert_eq!(dog.times(2, ' '), "Vau Vau");
}

#[test]
fn test_set_switches_implementation() {
    let mut animal: Animal = Animal::new(Cat);
    assert_eq!(animal.talk(), "Meow");

    animal.set(Dog {
        name: "Fido".to_string(),
    });
    assert_eq!(animal.talk(), "Vau, I am Fido");
    assert!(animal.erased().is::<Dog>());

    animal.set(Cat);
    assert_eq!(animal.talk(), "Meow");
}

#[test]
fn test_exclusive_operation_mutates_in_place() {
    let mut animal: Animal<DefaultInline> = Animal::new(Dog {
        name: "Rex".to_string(),
    });
    let before = animal.clone();

    animal.rename("Max".to_string());
    assert_eq!(animal.talk(), "Vau, I am Max");
    assert_eq!(before.talk(), "Vau, I am Rex");
}

#[test]
fn test_tables_in_a_collection() {
    let animals: Vec<Speaker> = vec![
        Speaker::new(Cat),
        Speaker::new(Dog {
            name: "Bello".to_string(),
        }),
        Speaker::new_with(|| Cat),
    ];

    let said: Vec<String> = animals.iter().map(Speaker::talk).collect();
    assert_eq!(said, ["Meow", "Vau, I am Bello", "Meow"]);
}

#[test]
fn test_clone_shares_no_state() {
    #[derive(Clone)]
    struct Counting(Rc<Cell<u32>>, u32);

    impl Talk for Counting {
        fn talk(&self) -> String {
            self.0.set(self.0.get() + 1);
            self.1.to_string()
        }

        fn rename(&mut self, _name: String) {
            self.1 += 1;
        }

        fn times(&self, count: usize, _separator: char) -> String {
            count.to_string()
        }
    }

    let calls = Rc::new(Cell::new(0));
    let mut original: Animal = Animal::new(Counting(calls.clone(), 0));
    let copy = original.clone();

    original.rename(String::new());
    assert_eq!(original.talk(), "1");
    assert_eq!(copy.talk(), "0");
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_into_erased_and_debug() {
    let animal: Animal = Animal::new(Cat);
    assert_eq!(
        format!("{animal:?}"),
        format!(
            "Animal {{ erased: Erased {{ storage: \"heap\", repr: {:?} }}, .. }}",
            std::any::type_name::<Cat>()
        )
    );

    let erased = animal.into_erased();
    assert!(erased.downcast::<Cat>().is_ok());
}

#[test]
fn test_standalone_thunks_match_table() {
    fn shout(dog: Dog, suffix: char) -> String {
        format!("{}{suffix}", dog.name.to_uppercase())
    }

    let talk = erase_ref::<Dog, fn() -> String, _>(<Dog as Talk>::talk);
    let shout = erase_owned::<Dog, fn(char) -> String, _>(shout);

    let erased: Erased = Erased::new(Dog {
        name: "Rex".to_string(),
    });
    // SAFETY: The container holds a `Dog`.
    unsafe {
        assert_eq!(talk(erased.handle()), "Vau, I am Rex");
        assert_eq!(shout(erased.handle(), '!'), "REX!");
    }
}

fn shared_operation_mutates_in_place<S: Storage>() {
    let counter: AnyBump<S> = AnyBump::new(Hits::default());
    assert_eq!(counter.bump(), 1);
    assert_eq!(counter.bump(), 2);

    let copy = counter.clone();
    assert_eq!(counter.bump(), 3);
    assert_eq!(copy.bump(), 3);
    assert_eq!(
        counter.erased().downcast_ref::<Hits>().map(|hits| hits.0.get()),
        Some(3)
    );
}

#[test]
fn test_shared_operation_mutates_in_place() {
    shared_operation_mutates_in_place::<Heap>();
    shared_operation_mutates_in_place::<DefaultInline>();
}

#[test]
fn test_operation_types_named_like_table_parameters() {
    use single_letter_types::{Adder, AnyCombine, R, T};

    let table: AnyCombine<DefaultInline, markers::SendSync> = AnyCombine::new(Adder(2));
    assert_eq!(table.combine(T(3)), R(5));
}
