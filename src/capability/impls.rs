//! Implementations of the adaptor traits for every supported arity.

use super::{EraseMut, EraseOwned, EraseRef, conjure, private::Token};
use crate::{Handle, HandleMut};

macro_rules! impl_erase {
    ($($arg:ident: $ty:ident),*) => {
        impl<Recv, F, Ret, $($ty,)*> EraseRef<Recv, fn($($ty,)*) -> Ret> for F
        where
            Recv: 'static,
            F: Fn(&Recv, $($ty,)*) -> Ret + Copy + 'static,
        {
            type Thunk = unsafe fn(Handle<'_>, $($ty,)*) -> Ret;

            #[inline]
            fn thunk(_token: Token) -> Self::Thunk {
                /// Calls `F` on the receiver behind `handle`.
                ///
                /// # Safety
                ///
                /// The caller must ensure:
                ///
                /// 1. `handle` points to a live `Recv`.
                unsafe fn thunk<Recv, F, Ret, $($ty,)*>(handle: Handle<'_>, $($arg: $ty,)*) -> Ret
                where
                    Recv: 'static,
                    F: Fn(&Recv, $($ty,)*) -> Ret + Copy + 'static,
                {
                    // SAFETY:
                    // 1. Guaranteed by the caller
                    let recv: &Recv = unsafe { handle.cast::<Recv>() };
                    let f: F = conjure::<F>();
                    f(recv, $($arg,)*)
                }

                thunk::<Recv, F, Ret, $($ty,)*>
            }
        }

        impl<Recv, F, Ret, $($ty,)*> EraseMut<Recv, fn($($ty,)*) -> Ret> for F
        where
            Recv: 'static,
            F: Fn(&mut Recv, $($ty,)*) -> Ret + Copy + 'static,
        {
            type Thunk = unsafe fn(HandleMut<'_>, $($ty,)*) -> Ret;

            #[inline]
            fn thunk(_token: Token) -> Self::Thunk {
                /// Calls `F` on the receiver behind `handle`.
                ///
                /// # Safety
                ///
                /// The caller must ensure:
                ///
                /// 1. `handle` points to a live `Recv`.
                unsafe fn thunk<Recv, F, Ret, $($ty,)*>(handle: HandleMut<'_>, $($arg: $ty,)*) -> Ret
                where
                    Recv: 'static,
                    F: Fn(&mut Recv, $($ty,)*) -> Ret + Copy + 'static,
                {
                    // SAFETY:
                    // 1. Guaranteed by the caller
                    let recv: &mut Recv = unsafe { handle.cast::<Recv>() };
                    let f: F = conjure::<F>();
                    f(recv, $($arg,)*)
                }

                thunk::<Recv, F, Ret, $($ty,)*>
            }
        }

        impl<Recv, F, Ret, $($ty,)*> EraseOwned<Recv, fn($($ty,)*) -> Ret> for F
        where
            Recv: Clone + 'static,
            F: Fn(Recv, $($ty,)*) -> Ret + Copy + 'static,
        {
            type Thunk = unsafe fn(Handle<'_>, $($ty,)*) -> Ret;

            #[inline]
            fn thunk(_token: Token) -> Self::Thunk {
                /// Calls `F` on a clone of the receiver behind `handle`.
                ///
                /// # Safety
                ///
                /// The caller must ensure:
                ///
                /// 1. `handle` points to a live `Recv`.
                unsafe fn thunk<Recv, F, Ret, $($ty,)*>(handle: Handle<'_>, $($arg: $ty,)*) -> Ret
                where
                    Recv: Clone + 'static,
                    F: Fn(Recv, $($ty,)*) -> Ret + Copy + 'static,
                {
                    // SAFETY:
                    // 1. Guaranteed by the caller
                    let recv: &Recv = unsafe { handle.cast::<Recv>() };
                    let f: F = conjure::<F>();
                    f(recv.clone(), $($arg,)*)
                }

                thunk::<Recv, F, Ret, $($ty,)*>
            }
        }
    };
}

impl_erase!();
impl_erase!(a0: A0);
impl_erase!(a0: A0, a1: A1);
impl_erase!(a0: A0, a1: A1, a2: A2);
impl_erase!(a0: A0, a1: A1, a2: A2, a3: A3);
impl_erase!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4);
impl_erase!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);

#[cfg(test)]
mod tests {
    use alloc::{format, string::String, vec::Vec};

    use crate::{
        Erased,
        capability::{erase_mut, erase_owned, erase_ref},
        storage::{DefaultInline, Heap},
    };

    #[derive(Clone, Debug, PartialEq)]
    struct Widget {
        name: String,
        clicks: u32,
    }

    impl Widget {
        fn new(name: &str) -> Self {
            Self {
                name: String::from(name),
                clicks: 0,
            }
        }

        fn name(&self) -> String {
            self.name.clone()
        }

        fn click(&mut self) -> u32 {
            self.clicks += 1;
            self.clicks
        }

        fn resize(&mut self, width: u32, height: u32) -> u32 {
            width * height + self.clicks
        }

        fn sum(&self, a: u8, b: u16, c: u32, d: u64, e: usize, f: i8) -> i128 {
            i128::from(a)
                + i128::from(b)
                + i128::from(c)
                + i128::from(d)
                + e as i128
                + i128::from(f)
                + i128::from(self.clicks)
        }
    }

    fn describe(widget: Widget, prefix: String) -> String {
        format!("{prefix}{}#{}", widget.name, widget.clicks)
    }

    #[test]
    fn test_thunks_are_pointer_sized() {
        let name = erase_ref::<Widget, fn() -> String, _>(Widget::name);
        assert_eq!(size_of_val(&name), size_of::<usize>());
    }

    #[test]
    fn test_erase_ref_and_mut() {
        let name = erase_ref::<Widget, fn() -> String, _>(Widget::name);
        let click = erase_mut::<Widget, fn() -> u32, _>(Widget::click);
        let resize = erase_mut::<Widget, fn(u32, u32) -> u32, _>(Widget::resize);

        let mut erased: Erased<Heap> = Erased::new(Widget::new("button"));

        // SAFETY: The container holds a `Widget`.
        unsafe {
            assert_eq!(name(erased.handle()), "button");
            assert_eq!(click(erased.handle_mut()), 1);
            assert_eq!(click(erased.handle_mut()), 2);
            assert_eq!(resize(erased.handle_mut(), 3, 4), 14);
        }
        assert_eq!(erased.downcast_ref::<Widget>().map(|w| w.clicks), Some(2));
    }

    #[test]
    fn test_erase_owned_clones_receiver() {
        let describe = erase_owned::<Widget, fn(String) -> String, _>(describe);
        let mut erased: Erased<DefaultInline> = Erased::new(Widget::new("slider"));
        if let Some(widget) = erased.downcast_mut::<Widget>() {
            widget.clicks = 7;
        }

        // SAFETY: The container holds a `Widget`.
        let described = unsafe { describe(erased.handle(), String::from("> ")) };
        assert_eq!(described, "> slider#7");
        assert_eq!(
            erased.downcast_ref::<Widget>(),
            Some(&Widget {
                name: String::from("slider"),
                clicks: 7
            })
        );
    }

    #[test]
    fn test_erase_widest_arity_and_closures() {
        let sum =
            erase_ref::<Widget, fn(u8, u16, u32, u64, usize, i8) -> i128, _>(Widget::sum);
        let count = erase_ref::<Vec<u8>, fn(u8) -> usize, _>(|bytes: &Vec<u8>, needle: u8| {
            bytes.iter().filter(|&&byte| byte == needle).count()
        });

        let widget: Erased = Erased::new(Widget::new("sum"));
        let bytes: Erased = Erased::new(Vec::from([1_u8, 2, 1, 3, 1]));

        // SAFETY: The containers hold a `Widget` and a `Vec<u8>` respectively.
        unsafe {
            assert_eq!(sum(widget.handle(), 1, 2, 3, 4, 5, -6), 9);
            assert_eq!(count(bytes.handle(), 1), 3);
        }
    }
}
