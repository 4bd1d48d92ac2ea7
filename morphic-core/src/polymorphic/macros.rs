// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Makes a trait usable as the target of `Rc<dyn Trait>`, `Box<dyn Trait>`
/// and `RcWeak<dyn Trait>` in serialized values.
///
/// The trait must extend [`Polymorphic`](crate::polymorphic::Polymorphic).
#[macro_export]
macro_rules! polymorphic_base {
    ($trait_name:ident) => {
        impl $crate::serializer::Pointee for dyn $trait_name {
            fn save_shared<A: $crate::archive::OutputArchive>(
                rc: &::std::rc::Rc<Self>,
                ar: &mut A,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                $crate::polymorphic::save_shared::<A, Self>(rc, ar)
            }

            fn save_null<A: $crate::archive::OutputArchive>(
                ar: &mut A,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                $crate::polymorphic::save_null(ar)
            }

            fn load_shared<A: $crate::archive::InputArchive>(
                ar: &mut A,
            ) -> ::std::result::Result<$crate::serializer::SharedHandle<Self>, $crate::error::Error>
            {
                $crate::polymorphic::load_shared::<A, Self>(ar)
            }

            fn save_unique<A: $crate::archive::OutputArchive>(
                value: ::std::option::Option<&Self>,
                ar: &mut A,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                $crate::polymorphic::save_unique::<A, Self>(value, ar)
            }

            fn load_unique<A: $crate::archive::InputArchive>(
                ar: &mut A,
            ) -> ::std::result::Result<
                ::std::option::Option<::std::boxed::Box<Self>>,
                $crate::error::Error,
            > {
                $crate::polymorphic::load_unique::<A, Self>(ar)
            }
        }
    };
}

/// Registers a concrete type under a stable name for every built-in
/// archive, and as directly derived from each listed base.
///
/// ```rust
/// use morphic_core::archive::{InputArchive, OutputArchive};
/// use morphic_core::error::Error;
/// use morphic_core::polymorphic::{BindingRegistry, Polymorphic};
/// use morphic_core::serializer::{Load, Save};
/// use morphic_core::{polymorphic_base, register_polymorphic};
///
/// pub trait Event: Polymorphic {}
/// polymorphic_base!(Event);
///
/// struct Tick;
/// impl Event for Tick {}
///
/// impl Save for Tick {
///     fn save<A: OutputArchive>(&self, _: &mut A) -> Result<(), Error> {
///         Ok(())
///     }
/// }
///
/// impl Load for Tick {
///     fn load<A: InputArchive>(_: &mut A) -> Result<Self, Error> {
///         Ok(Tick)
///     }
/// }
///
/// register_polymorphic!(Tick, "app::Tick", dyn Event);
///
/// # fn main() {
/// assert!(BindingRegistry::global().contains("app::Tick"));
/// # }
/// ```
#[macro_export]
macro_rules! register_polymorphic {
    ($ty:ty, $name:expr $(, $base:ty)*) => {
        const _: () = {
            fn __morphic_apply(
                casters: &$crate::polymorphic::PolymorphicCasters,
                bindings: &$crate::polymorphic::BindingRegistry,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                $(
                    casters.register(::std::sync::Arc::new(
                        $crate::polymorphic::ConcreteCaster::<$base, $ty>::new(
                            |derived: ::std::rc::Rc<$ty>| -> ::std::rc::Rc<$base> { derived },
                            |derived: ::std::boxed::Box<$ty>| -> ::std::boxed::Box<$base> {
                                derived
                            },
                        ),
                    ));
                )*
                let _ = casters;
                bindings.register_type::<$ty>($name)
            }

            $crate::inventory::submit! {
                $crate::polymorphic::StaticRegistration::new(__morphic_apply)
            }
        };
    };
}

/// Registers a relation without binding a type, either between a base
/// trait and a concrete type or between two traits.
///
/// `dyn Derived => ...` relations make every type registered under the
/// derived trait reachable from the base trait.
#[macro_export]
macro_rules! register_polymorphic_relation {
    (dyn $base:ident => dyn $derived:ident) => {
        const _: () = {
            fn __morphic_apply(
                casters: &$crate::polymorphic::PolymorphicCasters,
                _: &$crate::polymorphic::BindingRegistry,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                casters.register(::std::sync::Arc::new(
                    $crate::polymorphic::TraitCaster::<dyn $base, dyn $derived>::new(
                        |derived: ::std::rc::Rc<dyn $derived>| -> ::std::rc::Rc<dyn $base> {
                            derived
                        },
                        |derived: ::std::boxed::Box<dyn $derived>| -> ::std::boxed::Box<dyn $base> {
                            derived
                        },
                    ),
                ));
                Ok(())
            }

            $crate::inventory::submit! {
                $crate::polymorphic::StaticRegistration::new(__morphic_apply)
            }
        };
    };
    ($base:ty => $derived:ty) => {
        const _: () = {
            fn __morphic_apply(
                casters: &$crate::polymorphic::PolymorphicCasters,
                _: &$crate::polymorphic::BindingRegistry,
            ) -> ::std::result::Result<(), $crate::error::Error> {
                casters.register(::std::sync::Arc::new(
                    $crate::polymorphic::ConcreteCaster::<$base, $derived>::new(
                        |derived: ::std::rc::Rc<$derived>| -> ::std::rc::Rc<$base> { derived },
                        |derived: ::std::boxed::Box<$derived>| -> ::std::boxed::Box<$base> {
                            derived
                        },
                    ),
                ));
                Ok(())
            }

            $crate::inventory::submit! {
                $crate::polymorphic::StaticRegistration::new(__morphic_apply)
            }
        };
    };
}
