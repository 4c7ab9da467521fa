use anyhow::Result;
use futures::stream::StreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, to_bson, Document},
    Collection, Cursor,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;

pub trait MongoDocument<E>: Serialize + DeserializeOwned {
    fn to_domain(self) -> E;
    fn from_domain(entity: &E) -> Self;
}

fn get_id_filter(oid: &ObjectId) -> Document {
    doc! {
        "_id": *oid
    }
}

fn entity_to_persistence<E, D: MongoDocument<E>>(entity: &E) -> Document {
    let raw = D::from_domain(entity);
    doc_to_persistence(&raw)
}

fn persistence_to_entity<E, D: MongoDocument<E>>(doc: Document) -> Result<E> {
    let raw: D = bson::from_document(doc)?;
    Ok(raw.to_domain())
}

fn doc_to_persistence<E, D: MongoDocument<E>>(raw: &D) -> Document {
    to_bson(raw)
        .ok()
        .and_then(|b| b.as_document().cloned())
        .unwrap_or_default()
}

pub async fn insert<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    entity: &E,
) -> Result<()> {
    let doc = entity_to_persistence::<E, D>(entity);
    collection.insert_one(doc, None).await?;
    Ok(())
}

pub async fn find<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    id: &ObjectId,
) -> Option<E> {
    let filter = get_id_filter(id);
    find_one_by::<E, D>(collection, filter).await
}

pub async fn find_one_by<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    filter: Document,
) -> Option<E> {
    match collection.find_one(filter, None).await {
        Ok(Some(doc)) => persistence_to_entity::<E, D>(doc).ok(),
        _ => None,
    }
}

pub async fn find_many_by<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    filter: Document,
) -> Result<Vec<E>> {
    let cursor = collection.find(filter, None).await?;
    Ok(consume_cursor::<E, D>(cursor).await)
}

/// Updates the first document matching `filter` and reports whether a
/// document was actually modified. Filter and update are applied atomically
/// by the database, which is what makes conditional single-field updates
/// safe across concurrently running dispatchers.
pub async fn update_one_by<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    filter: Document,
    update: Document,
) -> Result<bool> {
    let res = collection.update_one(filter, update, None).await?;
    Ok(res.modified_count > 0)
}

async fn consume_cursor<E, D: MongoDocument<E>>(mut cursor: Cursor<Document>) -> Vec<E> {
    let mut documents = vec![];
    while let Some(result) = cursor.next().await {
        match result {
            Ok(document) => match persistence_to_entity::<E, D>(document) {
                Ok(entity) => documents.push(entity),
                Err(e) => {
                    error!("Error deserializing document: {:?}", e);
                }
            },
            Err(e) => {
                error!("Error consuming cursor: {:?}", e);
            }
        }
    }

    documents
}
