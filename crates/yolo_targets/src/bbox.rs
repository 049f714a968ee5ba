/// Four box coordinates, tagged with their layout: [`Xyxy`] corners or [`Cxcywh`] centre and
/// size. Ground truths arrive as normalized corners, anchors live in centre form in grid
/// cells, and [`ConvertBbox`] moves between the two.
///
/// ```
/// use yolo_targets::bbox::*;
///
/// let xyxy = Bbox::xyxy(0.4, 0.4, 0.6, 0.6).scaled(13.0, 13.0);
/// let cxcywh: Bbox<Cxcywh> = xyxy.convert();
///
/// assert!((cxcywh.inner.0 - 6.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox<T> {
    pub inner: (f32, f32, f32, f32),
    _marker: std::marker::PhantomData<T>,
}

impl<T> Bbox<T> {
    fn new(inner: (f32, f32, f32, f32)) -> Self {
        Bbox {
            inner,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> Bbox<T>
where
    Bbox<T>: ConvertBbox<Cxcywh>,
{
    /// Width and height of the box.
    pub fn size(&self) -> (f32, f32) {
        let (_, _, w, h) = ConvertBbox::<Cxcywh>::convert(self).inner;
        (w, h)
    }

    /// Area of the box, `w * h`.
    ///
    /// Inverted boxes yield a negative or zero area, callers are expected to validate.
    pub fn area(&self) -> f32 {
        let (w, h) = self.size();
        w * h
    }
}

/// Re-layout of the same box.
pub trait ConvertBbox<T> {
    fn convert(&self) -> Bbox<T>;
}

/// `(xmin, ymin, xmax, ymax)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyxy;

impl Bbox<Xyxy> {
    pub fn xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Bbox<Xyxy> {
        Bbox::new((x1, y1, x2, y2))
    }

    /// Clamp the corners into `[0, width] x [0, height]`.
    #[must_use]
    pub fn clamp(&self, width: f32, height: f32) -> Bbox<Xyxy> {
        let (x1, y1, x2, y2) = self.inner;
        Bbox::new((
            x1.clamp(0.0, width),
            y1.clamp(0.0, height),
            x2.clamp(0.0, width),
            y2.clamp(0.0, height),
        ))
    }

    /// Map normalized corners onto a `width x height` grid.
    #[must_use]
    pub fn scaled(&self, width: f32, height: f32) -> Bbox<Xyxy> {
        let (x1, y1, x2, y2) = self.inner;
        Bbox::new((x1 * width, y1 * height, x2 * width, y2 * height))
    }

    /// Signed overlap along the x and y axis.
    ///
    /// A negative value means the boxes are separated along that axis.
    pub fn axis_overlap(&self, other: &Bbox<Xyxy>) -> (f32, f32) {
        let (x1, y1, x2, y2) = self.inner;
        let (x3, y3, x4, y4) = other.inner;

        (x2.min(x4) - x1.max(x3), y2.min(y4) - y1.max(y3))
    }
}

impl ConvertBbox<Xyxy> for Bbox<Xyxy> {
    fn convert(&self) -> Bbox<Xyxy> {
        *self
    }
}

impl ConvertBbox<Cxcywh> for Bbox<Xyxy> {
    fn convert(&self) -> Bbox<Cxcywh> {
        let (x1, y1, x2, y2) = self.inner;
        Bbox::new(((x1 + x2) / 2.0, (y1 + y2) / 2.0, x2 - x1, y2 - y1))
    }
}

/// `(cx, cy, w, h)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cxcywh;

impl Bbox<Cxcywh> {
    pub fn cxcywh(cx: f32, cy: f32, w: f32, h: f32) -> Bbox<Cxcywh> {
        Bbox::new((cx, cy, w, h))
    }
}

impl ConvertBbox<Xyxy> for Bbox<Cxcywh> {
    fn convert(&self) -> Bbox<Xyxy> {
        let (cx, cy, w, h) = self.inner;
        Bbox::new((cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0))
    }
}

impl ConvertBbox<Cxcywh> for Bbox<Cxcywh> {
    fn convert(&self) -> Bbox<Cxcywh> {
        *self
    }
}
