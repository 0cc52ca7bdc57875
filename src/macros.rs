/// Macro to generate a capability table
///
/// A capability table is a struct pairing an [`Erased`] container with one
/// erased thunk per operation of a trait. The thunks are created together with
/// the container, for the same representation type, and are replaced together
/// whenever a new value is assigned. Calling an operation goes through a plain
/// function pointer, never through `dyn Trait`.
///
/// The macro takes the name of the struct to generate, the trait every
/// representation must implement, and the list of operations to erase. Each
/// operation is written like a trait method declaration taking `&self` or
/// `&mut self`:
///
/// ```text
/// capability_table! {
///     pub struct Name: Trait {
///         fn shared_method(&self, arg: ArgType) -> ReturnType;
///         fn exclusive_method(&mut self);
///     }
/// }
/// ```
///
/// Argument types must not contain elided lifetimes, and return types cannot
/// borrow from the receiver. The generic parameters of the generated items are
/// prefixed with `__`, so operations may use types of your own named `S`, `T`,
/// `R` or `F`.
///
/// ## Generated items
///
/// The generated struct has the same storage and thread-safety parameters as
/// [`Erased`], with the same defaults: `Name<S = Heap, T = Local>`. It has:
///
/// - `new(value)` and `new_with(init)`, accepting any `Trait + Clone`
///   representation;
/// - `set(value)`, which replaces the value and rebinds every operation;
/// - `erased()` for shared access to the container, and `into_erased()`;
/// - one method per operation, forwarding to the representation;
/// - [`Clone`] and [`Debug`](core::fmt::Debug) implementations.
///
/// [`Erased`]: crate::Erased
///
/// # Examples
///
/// ```
/// use clutch::prelude::*;
///
/// trait Shape {
///     fn area(&self) -> f64;
///     fn scale(&mut self, factor: f64);
/// }
///
/// #[derive(Clone)]
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
///
///     fn scale(&mut self, factor: f64) {
///         self.0 *= factor;
///     }
/// }
///
/// #[derive(Clone)]
/// struct Circle(f64);
///
/// impl Shape for Circle {
///     fn area(&self) -> f64 {
///         3.0 * self.0 * self.0
///     }
///
///     fn scale(&mut self, factor: f64) {
///         self.0 *= factor;
///     }
/// }
///
/// capability_table! {
///     /// A shape stored inline.
///     pub struct AnyShape: Shape {
///         /// Returns the area.
///         fn area(&self) -> f64;
///         fn scale(&mut self, factor: f64);
///     }
/// }
///
/// let mut shapes: Vec<AnyShape<DefaultInline>> =
///     vec![AnyShape::new(Square(2.0)), AnyShape::new(Circle(1.0))];
/// for shape in &mut shapes {
///     shape.scale(2.0);
/// }
///
/// let areas: Vec<f64> = shapes.iter().map(AnyShape::area).collect();
/// assert_eq!(areas, [16.0, 12.0]);
/// assert!(shapes[1].erased().is::<Circle>());
/// ```
#[macro_export]
macro_rules! capability_table {
    // Return type of an operation, `()` if omitted.
    (@ret []) => { () };
    (@ret [$ret:ty]) => { $ret };

    // Thunk type of an operation.
    (@thunk_ty shared [$($ty:ty),*] [$($ret:ty)?]) => {
        unsafe fn($crate::Handle<'_> $(, $ty)*) -> $crate::capability_table!(@ret [$($ret)?])
    };
    (@thunk_ty exclusive [$($ty:ty),*] [$($ret:ty)?]) => {
        unsafe fn($crate::HandleMut<'_> $(, $ty)*) -> $crate::capability_table!(@ret [$($ret)?])
    };

    // Thunk of an operation for the representation type `$repr`.
    (@erase shared $repr:ident, $bound:path, $method:ident [$($ty:ty),*] [$($ret:ty)?]) => {
        $crate::capability::erase_ref::<
            $repr,
            fn($($ty),*) -> $crate::capability_table!(@ret [$($ret)?]),
            _,
        >(<$repr as $bound>::$method)
    };
    (@erase exclusive $repr:ident, $bound:path, $method:ident [$($ty:ty),*] [$($ret:ty)?]) => {
        $crate::capability::erase_mut::<
            $repr,
            fn($($ty),*) -> $crate::capability_table!(@ret [$($ret)?]),
            _,
        >(<$repr as $bound>::$method)
    };

    // Forwarding method of an operation.
    (@method shared [$($attr:tt)*] $method:ident [$($arg:ident: $ty:ty),*] [$($ret:ty)?]) => {
        $($attr)*
        #[inline]
        pub fn $method(&self $(, $arg: $ty)*) -> $crate::capability_table!(@ret [$($ret)?]) {
            let handle = self.erased.handle();
            // SAFETY: The thunk was created for the type of the representation held
            // by `erased`, and both are only ever replaced together.
            unsafe { (self.$method)(handle $(, $arg)*) }
        }
    };
    (@method exclusive [$($attr:tt)*] $method:ident [$($arg:ident: $ty:ty),*] [$($ret:ty)?]) => {
        $($attr)*
        #[inline]
        pub fn $method(&mut self $(, $arg: $ty)*) -> $crate::capability_table!(@ret [$($ret)?]) {
            let handle = self.erased.handle_mut();
            // SAFETY: The thunk was created for the type of the representation held
            // by `erased`, and both are only ever replaced together.
            unsafe { (self.$method)(handle $(, $arg)*) }
        }
    };

    // All operations parsed.
    (@munch $head:tt [$($done:tt)*]) => {
        $crate::capability_table!(@emit $head [$($done)*]);
    };
    (@munch $head:tt [$($done:tt)*]
        $(#[$attr:meta])*
        fn $method:ident(&self $(, $arg:ident: $ty:ty)*) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $crate::capability_table!(
            @munch $head
            [$($done)* [shared [$(#[$attr])*] $method [$($arg: $ty),*] [$($ret)?]]]
            $($rest)*
        );
    };
    (@munch $head:tt [$($done:tt)*]
        $(#[$attr:meta])*
        fn $method:ident(&mut self $(, $arg:ident: $ty:ty)*) $(-> $ret:ty)?;
        $($rest:tt)*
    ) => {
        $crate::capability_table!(
            @munch $head
            [$($done)* [exclusive [$(#[$attr])*] $method [$($arg: $ty),*] [$($ret)?]]]
            $($rest)*
        );
    };

    (@emit { [$($attr:tt)*] [$vis:vis] $name:ident $bound:path } [$(
        [$kind:ident [$($method_attr:tt)*] $method:ident [$($arg:ident: $ty:ty),*] [$($ret:ty)?]]
    )*]) => {
        $($attr)*
        $vis struct $name<
            __S: $crate::storage::Storage = $crate::storage::Heap,
            __T: 'static = $crate::markers::Local,
        > {
            erased: $crate::Erased<__S, __T>,
            $(
                $method: $crate::capability_table!(@thunk_ty $kind [$($ty),*] [$($ret)?]),
            )*
        }

        impl<__S: $crate::storage::Storage, __T: 'static> $name<__S, __T> {
            /// Creates a table holding `value`, with every operation bound to
            /// its type.
            #[must_use]
            pub fn new<__R>(value: __R) -> Self
            where
                __R: $bound + $crate::__private::Clone + $crate::markers::ObjectMarkerFor<__T>,
            {
                Self::new_with(move || value)
            }

            /// Creates a table holding the value produced by `init`,
            /// constructed directly in its final storage.
            #[must_use]
            pub fn new_with<__R, __F>(init: __F) -> Self
            where
                __R: $bound + $crate::__private::Clone + $crate::markers::ObjectMarkerFor<__T>,
                __F: FnOnce() -> __R,
            {
                Self {
                    erased: $crate::Erased::new_with(init),
                    $(
                        $method: $crate::capability_table!(
                            @erase $kind __R, $bound, $method [$($ty),*] [$($ret)?]
                        ),
                    )*
                }
            }

            /// Replaces the held value with `value`, rebinding every operation
            /// to its type.
            pub fn set<__R>(&mut self, value: __R)
            where
                __R: $bound + $crate::__private::Clone + $crate::markers::ObjectMarkerFor<__T>,
            {
                *self = Self::new(value);
            }

            /// Returns the container holding the value.
            #[must_use]
            pub fn erased(&self) -> &$crate::Erased<__S, __T> {
                &self.erased
            }

            /// Consumes the table and returns the container holding the value.
            #[must_use]
            pub fn into_erased(self) -> $crate::Erased<__S, __T> {
                self.erased
            }

            $(
                $crate::capability_table!(
                    @method $kind [$($method_attr)*] $method [$($arg: $ty),*] [$($ret)?]
                );
            )*
        }

        impl<__S: $crate::storage::Storage, __T: 'static> $crate::__private::Clone for $name<__S, __T> {
            fn clone(&self) -> Self {
                Self {
                    erased: $crate::__private::Clone::clone(&self.erased),
                    $($method: self.$method,)*
                }
            }
        }

        impl<__S: $crate::storage::Storage, __T: 'static> $crate::__private::Debug for $name<__S, __T> {
            fn fmt(
                &self,
                f: &mut $crate::__private::Formatter<'_>,
            ) -> $crate::__private::FmtResult {
                f.debug_struct(::core::stringify!($name))
                    .field("erased", &self.erased)
                    .finish_non_exhaustive()
            }
        }
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $bound:path {
            $($body:tt)*
        }
    ) => {
        $crate::capability_table!(
            @munch { [$(#[$attr])*] [$vis] $name $bound } [] $($body)*
        );
    };
}
