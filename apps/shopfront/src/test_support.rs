//! In-process backend fake and context helpers for command tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use shopfront_api::{BackendError, BackendResult, ShopBackend};
use shopfront_core::{
    CreatedSale, Discount, DiscountUpdate, FrequentCustomer, LoginPerson, LoginRequest,
    LoginResponse, Money, NewSale, Person, PersonUpdate, Product, ProductUpdate, Registration,
    Role, Sale, SaleLine, SessionUser, TopSellingProduct,
};
use shopfront_db::{Database, DbConfig};

use crate::state::{AppConfig, AppContext};

/// Records every call and serves canned data.
#[derive(Default)]
pub struct FakeBackend {
    pub products: Mutex<Vec<Product>>,
    pub persons: Mutex<Vec<Person>>,
    pub passwords: Mutex<HashMap<String, String>>,
    pub discounts: Mutex<Vec<Discount>>,
    pub active_discount: Mutex<Option<Discount>>,
    pub sales: Mutex<Vec<Sale>>,
    pub sale_lines: Mutex<Vec<SaleLine>>,
    pub frequent: Mutex<Vec<FrequentCustomer>>,
    pub top_selling: Mutex<Vec<TopSellingProduct>>,

    /// Every sale-line POST fails.
    pub fail_sale_lines: AtomicBool,
    /// Fetching the lines of this sale fails.
    pub fail_sale_lines_for: Mutex<Option<i64>>,
    /// The frequent-customer ranking fails.
    pub fail_frequent: AtomicBool,
    /// Registration is rejected with this message.
    pub reject_registration: Mutex<Option<String>>,

    calls: Mutex<Vec<&'static str>>,
    next_sale_id: AtomicI64,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let fake = FakeBackend::default();
        fake.next_sale_id.store(100, Ordering::SeqCst);
        Arc::new(fake)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn unavailable() -> BackendError {
        BackendError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ShopBackend for FakeBackend {
    async fn products(&self) -> BackendResult<Vec<Product>> {
        self.record("products");
        Ok(self.products.lock().unwrap().clone())
    }

    async fn active_products(&self) -> BackendResult<Vec<Product>> {
        self.record("active_products");
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn product(&self, id: i64) -> BackendResult<Option<Product>> {
        self.record("product");
        Ok(self.products.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn update_product(&self, id: i64, update: &ProductUpdate) -> BackendResult<Product> {
        self.record("update_product");
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound {
                entity: "product",
                id: id.to_string(),
            })?;
        product.name = update.name.clone();
        product.description = update.description.clone();
        product.price = update.price;
        product.stock = update.stock;
        product.is_active = update.is_active;
        product.updated_by_email = Some(update.updated_by_email.clone());
        Ok(product.clone())
    }

    async fn top_selling_products(&self) -> BackendResult<Vec<TopSellingProduct>> {
        self.record("top_selling_products");
        Ok(self.top_selling.lock().unwrap().clone())
    }

    async fn persons(&self) -> BackendResult<Vec<Person>> {
        self.record("persons");
        Ok(self.persons.lock().unwrap().clone())
    }

    async fn person(&self, email: &str) -> BackendResult<Person> {
        self.record("person");
        self.persons
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                entity: "person",
                id: email.to_string(),
            })
    }

    async fn update_person(&self, email: &str, update: &PersonUpdate) -> BackendResult<Person> {
        self.record("update_person");
        let mut persons = self.persons.lock().unwrap();
        let person = persons
            .iter_mut()
            .find(|p| p.email == email)
            .ok_or_else(|| BackendError::NotFound {
                entity: "person",
                id: email.to_string(),
            })?;
        if let Some(new_email) = &update.email {
            person.email = new_email.clone();
        }
        person.name = update.name.clone();
        person.address = update.address.clone();
        person.phone = update.phone.clone();
        person.role = update.role;
        if let Some(frequent) = update.is_frequent_customer {
            person.is_frequent_customer = frequent;
        }
        Ok(person.clone())
    }

    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginResponse> {
        self.record("login");
        let passwords = self.passwords.lock().unwrap();
        if passwords.get(&request.email) != Some(&request.password) {
            return Err(BackendError::Status {
                status: 401,
                message: "Unauthorized".to_string(),
            });
        }

        let persons = self.persons.lock().unwrap();
        let person = persons
            .iter()
            .find(|p| p.email == request.email)
            .ok_or_else(Self::unavailable)?;
        Ok(LoginResponse {
            person: LoginPerson {
                name: person.name.clone(),
                email: person.email.clone(),
            },
            role: person.role,
        })
    }

    async fn register(&self, registration: &Registration) -> BackendResult<()> {
        self.record("register");
        if let Some(message) = self.reject_registration.lock().unwrap().clone() {
            return Err(BackendError::Status { status: 400, message });
        }

        self.persons.lock().unwrap().push(Person {
            email: registration.email.clone(),
            name: registration.name.clone(),
            address: registration.address.clone(),
            phone: registration.phone.clone(),
            is_frequent_customer: registration.is_frequent_customer,
            role: registration.role,
            created_at: Some(Utc::now()),
        });
        self.passwords
            .lock()
            .unwrap()
            .insert(registration.email.clone(), registration.password.clone());
        Ok(())
    }

    async fn discounts(&self) -> BackendResult<Vec<Discount>> {
        self.record("discounts");
        Ok(self.discounts.lock().unwrap().clone())
    }

    async fn active_discount(&self) -> BackendResult<Option<Discount>> {
        self.record("active_discount");
        Ok(self.active_discount.lock().unwrap().clone())
    }

    async fn update_discount(&self, id: i64, update: &DiscountUpdate) -> BackendResult<Discount> {
        self.record("update_discount");
        let mut discounts = self.discounts.lock().unwrap();
        let discount = discounts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BackendError::NotFound {
                entity: "discount",
                id: id.to_string(),
            })?;
        discount.start_date = update.start_date;
        discount.end_date = update.end_date;
        discount.discount_avg = update.discount_percentage;
        Ok(discount.clone())
    }

    async fn create_sale(&self, sale: &NewSale) -> BackendResult<CreatedSale> {
        self.record("create_sale");
        let id = self.next_sale_id.fetch_add(1, Ordering::SeqCst);
        self.sales.lock().unwrap().push(Sale {
            id,
            person_email: Some(sale.person_email.clone()),
            discount: sale.discount,
            created_at: Some(Utc::now()),
        });
        Ok(CreatedSale { id })
    }

    async fn sale(&self, id: i64) -> BackendResult<Option<Sale>> {
        self.record("sale");
        Ok(self.sales.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn sales_by_person(&self, email: &str) -> BackendResult<Vec<Sale>> {
        self.record("sales_by_person");
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.person_email.as_deref() == Some(email))
            .cloned()
            .collect())
    }

    async fn top_frequent_customers(&self) -> BackendResult<Vec<FrequentCustomer>> {
        self.record("top_frequent_customers");
        if self.fail_frequent.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.frequent.lock().unwrap().clone())
    }

    async fn create_sale_line(&self, line: &SaleLine) -> BackendResult<()> {
        self.record("create_sale_line");
        if self.fail_sale_lines.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.sale_lines.lock().unwrap().push(line.clone());
        Ok(())
    }

    async fn sale_lines(&self, sale_id: i64) -> BackendResult<Vec<SaleLine>> {
        self.record("sale_lines");
        if *self.fail_sale_lines_for.lock().unwrap() == Some(sale_id) {
            return Err(Self::unavailable());
        }
        Ok(self
            .sale_lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.sale_id == Some(sale_id))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn product(id: i64, name: &str, cents: i64, is_active: bool) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        price: Money::from_cents(cents),
        stock: 10,
        is_active,
        created_at: None,
        updated_at: None,
        updated_by_email: None,
    }
}

pub fn person(email: &str, name: &str, role: Role) -> Person {
    Person {
        email: email.to_string(),
        name: name.to_string(),
        address: "1 Main St".to_string(),
        phone: "555-0100".to_string(),
        is_frequent_customer: false,
        role,
        created_at: None,
    }
}

/// A context over a fresh in-memory store.
pub async fn context(backend: Arc<FakeBackend>) -> AppContext {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppContext::new(AppConfig::default(), db, backend).await.unwrap()
}

/// Stores an identity the way login does.
pub async fn sign_in(ctx: &AppContext, email: &str, role: Role) {
    let store = ctx.session.store();
    store
        .set_user(&SessionUser {
            name: "Test User".to_string(),
            role,
            email: email.to_string(),
        })
        .await
        .unwrap();
    store.set_email(email).await.unwrap();
}
