use std::fmt;
use std::marker::PhantomData;
use std::ops;

use log::debug;

use crate::array::NdArray;
use crate::error::{Error, Result};
use crate::index::{try_normalize, Index};
use crate::layout::{checked_elem_count, Indices};
use crate::sequence::Sequence;
use crate::slice::NdSlice;

// Lazy elementwise expressions
//
// `a + b` on two views does not compute anything. It builds a BinaryExpr
// node holding both operands and a zero-sized kernel tag. Indexing the node
// evaluates the kernel on the operands' elements at that index, fresh on
// every call:
//
//   (a + b).get(i) == a.get(i) + b.get(i)
//
// Nodes are operands too, so `(a + b) * c` nests without ever allocating.
// The only allocation point is `eval`, which walks every index of the shape
// once and stores the results in a new NdArray.
//
// Operands must agree in shape. That is not checked on `get`; `try_new`,
// `try_get` and `eval` report a ShapeMismatch, and the `checked` feature turns
// a mismatch on `get` into a panic.

/// Element-wise binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Element-wise unary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
        }
    }
}

/// Validate every axis of `index` against `shape`.
pub fn check_index<const N: usize>(shape: &[usize; N], index: &[isize; N]) -> Result<()> {
    for i in 0..N {
        try_normalize(index[i], shape[i])?;
    }
    Ok(())
}

/// The call contract shared by views, arrays and expression nodes: exactly
/// `N` indices in, one element out, no side effects, no allocation.
pub trait NdAccess<const N: usize> {
    type Elem;

    fn shape(&self) -> [usize; N];

    /// The element at a multi-index; negative indices count from the end.
    fn get(&self, index: [isize; N]) -> Self::Elem;

    /// Verify that all operands below this node agree in shape.
    fn check_shapes(&self) -> Result<()> {
        Ok(())
    }

    /// Checked [`NdAccess::get`].
    fn try_get(&self, index: [isize; N]) -> Result<Self::Elem> {
        self.check_shapes()?;
        check_index(&self.shape(), &index)?;
        Ok(self.get(index))
    }

    /// [`NdAccess::get`] for any index type, including [`End`](crate::End).
    fn at<I: Into<Index>>(&self, index: [I; N]) -> Self::Elem
    where
        Self: Sized,
    {
        self.get(index.map(|i| Into::<Index>::into(i).get()))
    }

    /// Materialize into a freshly allocated row-major array.
    fn eval(&self) -> Result<NdArray<Self::Elem, N>>
    where
        Self: Sized,
        Self::Elem: Copy,
    {
        eval(self)
    }
}

/// Materialize any [`NdAccess`] into a new [`NdArray`] of the same shape.
pub fn eval<E, const N: usize>(expr: &E) -> Result<NdArray<E::Elem, N>>
where
    E: NdAccess<N> + ?Sized,
    E::Elem: Copy,
{
    expr.check_shapes()?;
    let shape = expr.shape();
    checked_elem_count(&shape)?;
    debug!("materializing expression of shape={:?}", shape);
    let data = Indices::new(shape)
        .map(|i| expr.get(i.map(|x| x as isize)))
        .collect();
    Ok(NdArray::from_contiguous(data, shape))
}

impl<S: Sequence, const N: usize> NdAccess<N> for NdSlice<S, N> {
    type Elem = S::Item;

    fn shape(&self) -> [usize; N] {
        *NdSlice::shape(self)
    }

    #[inline]
    fn get(&self, index: [isize; N]) -> S::Item {
        NdSlice::get(self, index)
    }
}

impl<T: Copy, const N: usize> NdAccess<N> for NdArray<T, N> {
    type Elem = T;

    fn shape(&self) -> [usize; N] {
        *NdArray::shape(self)
    }

    #[inline]
    fn get(&self, index: [isize; N]) -> T {
        NdArray::get(self, index)
    }
}

impl<A: NdAccess<N> + ?Sized, const N: usize> NdAccess<N> for &A {
    type Elem = A::Elem;

    fn shape(&self) -> [usize; N] {
        (**self).shape()
    }

    #[inline]
    fn get(&self, index: [isize; N]) -> A::Elem {
        (**self).get(index)
    }

    fn check_shapes(&self) -> Result<()> {
        (**self).check_shapes()
    }
}

pub mod kernel {
    //! Zero-sized operator tags for expression nodes.

    use std::ops;

    use super::{BinaryOp, UnaryOp};

    /// Tag of a binary kernel.
    pub trait BinaryKernel {
        const OP: BinaryOp;
    }

    /// A binary kernel applicable to `L` and `R` elements.
    pub trait BinaryApply<L, R>: BinaryKernel {
        type Output;
        fn apply(lhs: L, rhs: R) -> Self::Output;
    }

    /// Tag of a unary kernel.
    pub trait UnaryKernel {
        const OP: UnaryOp;
    }

    /// A unary kernel applicable to `T` elements.
    pub trait UnaryApply<T>: UnaryKernel {
        type Output;
        fn apply(value: T) -> Self::Output;
    }

    macro_rules! binary_kernel {
        ($name:ident, $trait:ident, $method:ident) => {
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            impl BinaryKernel for $name {
                const OP: BinaryOp = BinaryOp::$name;
            }

            impl<L: ops::$trait<R>, R> BinaryApply<L, R> for $name {
                type Output = L::Output;

                #[inline]
                fn apply(lhs: L, rhs: R) -> Self::Output {
                    ops::$trait::$method(lhs, rhs)
                }
            }
        };
    }

    binary_kernel!(Add, Add, add);
    binary_kernel!(Sub, Sub, sub);
    binary_kernel!(Mul, Mul, mul);
    binary_kernel!(Div, Div, div);
    binary_kernel!(Rem, Rem, rem);

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Neg;

    impl UnaryKernel for Neg {
        const OP: UnaryOp = UnaryOp::Neg;
    }

    impl<T: ops::Neg> UnaryApply<T> for Neg {
        type Output = T::Output;

        #[inline]
        fn apply(value: T) -> Self::Output {
            -value
        }
    }
}

use kernel::{BinaryApply, BinaryKernel, UnaryApply, UnaryKernel};

/// `K` applied pointwise to two operands of rank `N`.
#[derive(Debug, Clone, Copy)]
pub struct BinaryExpr<K, A, B, const N: usize> {
    lhs: A,
    rhs: B,
    _kernel: PhantomData<K>,
}

impl<K, A, B, const N: usize> BinaryExpr<K, A, B, N> {
    /// Build a node without comparing operand shapes.
    pub fn new(lhs: A, rhs: B) -> Self {
        BinaryExpr {
            lhs,
            rhs,
            _kernel: PhantomData,
        }
    }

    pub fn lhs(&self) -> &A {
        &self.lhs
    }

    pub fn rhs(&self) -> &B {
        &self.rhs
    }

    pub fn op(&self) -> BinaryOp
    where
        K: BinaryKernel,
    {
        K::OP
    }
}

impl<K, A, B, const N: usize> BinaryExpr<K, A, B, N>
where
    A: NdAccess<N>,
    B: NdAccess<N>,
{
    /// Build a node, rejecting operands whose shapes differ.
    pub fn try_new(lhs: A, rhs: B) -> Result<Self> {
        let node = Self::new(lhs, rhs);
        node.operands_agree()?;
        Ok(node)
    }

    fn operands_agree(&self) -> Result<()> {
        let (l, r) = (self.lhs.shape(), self.rhs.shape());
        if l != r {
            return Err(Error::ShapeMismatch {
                expected: l.to_vec(),
                got: r.to_vec(),
            });
        }
        Ok(())
    }
}

impl<K, A, B, const N: usize> NdAccess<N> for BinaryExpr<K, A, B, N>
where
    A: NdAccess<N>,
    B: NdAccess<N>,
    K: BinaryApply<A::Elem, B::Elem>,
{
    type Elem = K::Output;

    fn shape(&self) -> [usize; N] {
        self.lhs.shape()
    }

    #[inline]
    fn get(&self, index: [isize; N]) -> K::Output {
        if cfg!(feature = "checked") {
            if let Err(e) = self.operands_agree() {
                panic!("{e}");
            }
        }
        K::apply(self.lhs.get(index), self.rhs.get(index))
    }

    fn check_shapes(&self) -> Result<()> {
        self.lhs.check_shapes()?;
        self.rhs.check_shapes()?;
        self.operands_agree()
    }
}

/// `K` applied pointwise to one operand of rank `N`.
#[derive(Debug, Clone, Copy)]
pub struct UnaryExpr<K, A, const N: usize> {
    operand: A,
    _kernel: PhantomData<K>,
}

impl<K, A, const N: usize> UnaryExpr<K, A, N> {
    pub fn new(operand: A) -> Self {
        UnaryExpr {
            operand,
            _kernel: PhantomData,
        }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    pub fn op(&self) -> UnaryOp
    where
        K: UnaryKernel,
    {
        K::OP
    }
}

impl<K, A, const N: usize> NdAccess<N> for UnaryExpr<K, A, N>
where
    A: NdAccess<N>,
    K: UnaryApply<A::Elem>,
{
    type Elem = K::Output;

    fn shape(&self) -> [usize; N] {
        self.operand.shape()
    }

    #[inline]
    fn get(&self, index: [isize; N]) -> K::Output {
        K::apply(self.operand.get(index))
    }

    fn check_shapes(&self) -> Result<()> {
        self.operand.check_shapes()
    }
}

// Operator overloads
//
// Every addressable type gets `+ - * / %` against any `NdAccess<N>` right-hand
// side, plus unary `-`, both by value and by reference. Building the node is
// all these do.

macro_rules! impl_binary_op {
    ([$($gen:tt)*] $ty:ty, $trait:ident, $method:ident) => {
        impl<Rhs, $($gen)*> ops::$trait<Rhs> for $ty
        where
            Rhs: NdAccess<N>,
        {
            type Output = BinaryExpr<kernel::$trait, Self, Rhs, N>;

            fn $method(self, rhs: Rhs) -> Self::Output {
                BinaryExpr::new(self, rhs)
            }
        }

        impl<'a, Rhs, $($gen)*> ops::$trait<Rhs> for &'a $ty
        where
            Rhs: NdAccess<N>,
        {
            type Output = BinaryExpr<kernel::$trait, &'a $ty, Rhs, N>;

            fn $method(self, rhs: Rhs) -> Self::Output {
                BinaryExpr::new(self, rhs)
            }
        }
    };
}

macro_rules! impl_ops {
    ([$($gen:tt)*] $ty:ty) => {
        impl_binary_op!([$($gen)*] $ty, Add, add);
        impl_binary_op!([$($gen)*] $ty, Sub, sub);
        impl_binary_op!([$($gen)*] $ty, Mul, mul);
        impl_binary_op!([$($gen)*] $ty, Div, div);
        impl_binary_op!([$($gen)*] $ty, Rem, rem);

        impl<$($gen)*> ops::Neg for $ty {
            type Output = UnaryExpr<kernel::Neg, Self, N>;

            fn neg(self) -> Self::Output {
                UnaryExpr::new(self)
            }
        }

        impl<'a, $($gen)*> ops::Neg for &'a $ty {
            type Output = UnaryExpr<kernel::Neg, &'a $ty, N>;

            fn neg(self) -> Self::Output {
                UnaryExpr::new(self)
            }
        }
    };
}

impl_ops!([S, const N: usize] NdSlice<S, N>);
impl_ops!([T, const N: usize] NdArray<T, N>);
impl_ops!([K, A, B, const N: usize] BinaryExpr<K, A, B, N>);
impl_ops!([K, A, const N: usize] UnaryExpr<K, A, N>);
