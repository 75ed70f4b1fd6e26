//! `tf.train.Example` messages and the object-detection record schema.
//!
//! The message types are hand-written prost structs mirroring TensorFlow's
//! `feature.proto` / `example.proto`; only the subset the detection schema
//! needs is modeled. `Features` uses a `BTreeMap` so serialized records are
//! byte-for-byte deterministic.

use std::collections::BTreeMap;

use crate::bbox::{BBoxXYXY, Normalized};
use crate::image::EncodedImage;

/// Protobuf `tensorflow.BytesList`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BytesList {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

/// Protobuf `tensorflow.FloatList`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatList {
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

/// Protobuf `tensorflow.Int64List`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

/// Protobuf `tensorflow.Feature`: one of the three list kinds.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Feature {
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

pub mod feature {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

impl Feature {
    pub fn as_bytes_list(&self) -> Option<&[Vec<u8>]> {
        match &self.kind {
            Some(feature::Kind::BytesList(list)) => Some(&list.value),
            _ => None,
        }
    }

    pub fn as_float_list(&self) -> Option<&[f32]> {
        match &self.kind {
            Some(feature::Kind::FloatList(list)) => Some(&list.value),
            _ => None,
        }
    }

    pub fn as_int64_list(&self) -> Option<&[i64]> {
        match &self.kind {
            Some(feature::Kind::Int64List(list)) => Some(&list.value),
            _ => None,
        }
    }
}

/// Protobuf `tensorflow.Features`: named feature map.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Features {
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

/// Protobuf `tensorflow.Example`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Example {
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

impl Example {
    /// Looks up a named feature, if present.
    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }
}

pub fn bytes_feature(value: Vec<u8>) -> Feature {
    Feature {
        kind: Some(feature::Kind::BytesList(BytesList { value: vec![value] })),
    }
}

pub fn bytes_list_feature(value: Vec<Vec<u8>>) -> Feature {
    Feature {
        kind: Some(feature::Kind::BytesList(BytesList { value })),
    }
}

pub fn float_list_feature(value: Vec<f32>) -> Feature {
    Feature {
        kind: Some(feature::Kind::FloatList(FloatList { value })),
    }
}

pub fn int64_feature(value: i64) -> Feature {
    Feature {
        kind: Some(feature::Kind::Int64List(Int64List { value: vec![value] })),
    }
}

pub fn int64_list_feature(value: Vec<i64>) -> Feature {
    Feature {
        kind: Some(feature::Kind::Int64List(Int64List { value })),
    }
}

/// Parallel per-object arrays destined for the `image/object/*` keys.
///
/// `push` is the only way to add an object, so the six arrays always stay
/// the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectFeatures {
    xmin: Vec<f32>,
    xmax: Vec<f32>,
    ymin: Vec<f32>,
    ymax: Vec<f32>,
    labels: Vec<i64>,
    names: Vec<Vec<u8>>,
}

impl ObjectFeatures {
    pub fn push(&mut self, bbox: BBoxXYXY<Normalized>, label: i64, name: &str) {
        self.xmin.push(bbox.xmin() as f32);
        self.xmax.push(bbox.xmax() as f32);
        self.ymin.push(bbox.ymin() as f32);
        self.ymax.push(bbox.ymax() as f32);
        self.labels.push(label);
        self.names.push(name.as_bytes().to_vec());
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Assembles a labeled example: image-level fields plus the (possibly
/// empty) object arrays.
pub fn labeled_example(image: &EncodedImage, objects: ObjectFeatures) -> Example {
    let mut feature = image_features(image);

    feature.insert(
        "image/object/bbox/xmin".to_string(),
        float_list_feature(objects.xmin),
    );
    feature.insert(
        "image/object/bbox/xmax".to_string(),
        float_list_feature(objects.xmax),
    );
    feature.insert(
        "image/object/bbox/ymin".to_string(),
        float_list_feature(objects.ymin),
    );
    feature.insert(
        "image/object/bbox/ymax".to_string(),
        float_list_feature(objects.ymax),
    );
    feature.insert(
        "image/object/class/label".to_string(),
        int64_list_feature(objects.labels),
    );
    feature.insert(
        "image/object/class/text".to_string(),
        bytes_list_feature(objects.names),
    );

    Example {
        features: Some(Features { feature }),
    }
}

/// Assembles an unlabeled example carrying only image-level fields.
pub fn unlabeled_example(image: &EncodedImage) -> Example {
    Example {
        features: Some(Features {
            feature: image_features(image),
        }),
    }
}

fn image_features(image: &EncodedImage) -> BTreeMap<String, Feature> {
    let mut feature = BTreeMap::new();
    feature.insert("image/height".to_string(), int64_feature(image.height));
    feature.insert("image/width".to_string(), int64_feature(image.width));
    feature.insert(
        "image/filename".to_string(),
        bytes_feature(image.source_id.as_bytes().to_vec()),
    );
    feature.insert(
        "image/source_id".to_string(),
        bytes_feature(image.source_id.as_bytes().to_vec()),
    );
    feature.insert(
        "image/key/sha256".to_string(),
        bytes_feature(image.key_sha256.as_bytes().to_vec()),
    );
    feature.insert(
        "image/encoded".to_string(),
        bytes_feature(image.encoded.clone()),
    );
    feature.insert(
        "image/format".to_string(),
        bytes_feature(image.format.as_str().as_bytes().to_vec()),
    );
    feature
}
