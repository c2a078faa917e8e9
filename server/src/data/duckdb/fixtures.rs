//! In-memory mart fixtures for tests

use std::sync::Arc;

use duckdb::Connection;

use super::DuckdbService;
use crate::core::config::DatabaseTarget;

const SCHEMA: &str = "
    CREATE SCHEMA mart;
    CREATE TABLE mart.sales_orders_fact (
        order_date DATE,
        region VARCHAR,
        product_category VARCHAR,
        channel VARCHAR,
        revenue DECIMAL(12, 2),
        visitor_id VARCHAR
    );
    CREATE TABLE mart.procurement_orders_fact (
        purchase_date DATE,
        supplier VARCHAR,
        material_group VARCHAR,
        plant VARCHAR,
        spend DECIMAL(12, 2),
        requested_delivery_date DATE,
        actual_delivery_date DATE
    );
    CREATE TABLE mart.gl_postings_fact (
        posting_period VARCHAR,
        company_code VARCHAR,
        cost_center VARCHAR,
        account VARCHAR,
        account_type VARCHAR,
        amount DECIMAL(12, 2)
    );
";

const ROWS: &str = "
    INSERT INTO mart.sales_orders_fact VALUES
        ('2025-01-05', 'DACH', 'Electronics', 'Online', 100.00, 'v1'),
        ('2025-01-15', 'DACH', 'Furniture', 'Retail', 200.00, 'v2'),
        ('2025-01-20', 'UK', 'Electronics', 'Online', 300.00, 'v1'),
        ('2025-02-10', 'DACH', 'Electronics', 'Retail', 400.00, 'v3'),
        ('2025-02-11', 'Nordics', 'Furniture', 'Online', 50.00, 'v4'),
        ('2025-03-01', 'UK', 'Furniture', 'Online', 150.00, 'v2');
    INSERT INTO mart.procurement_orders_fact VALUES
        ('2025-01-10', 'Acme', 'Steel', 'P100', 1000.00, '2025-01-20', '2025-01-18'),
        ('2025-01-12', 'Bolt', 'Plastics', 'P100', 500.00, '2025-01-22', '2025-01-25'),
        ('2025-02-03', 'Acme', 'Steel', 'P200', 1500.00, '2025-02-13', NULL),
        ('2025-02-20', 'Core', 'Electronics', 'P200', 250.50, '2025-03-01', '2025-03-01');
    INSERT INTO mart.gl_postings_fact VALUES
        ('2025-01', 'C100', 'CC10', '4000', 'REVENUE', 1000.00),
        ('2025-01', 'C100', 'CC20', '5000', 'EXPENSE', -400.00),
        ('2025-02', 'C200', 'CC10', '4010', 'revenue', 500.00),
        ('2025-02', 'C200', 'CC30', '5100', 'expense', -300.00),
        ('2025-03', 'C100', 'CC20', '5200', 'EXPENSE', -100.00),
        ('2025-03', 'C100', 'CC10', '4000', 'OPERATING_INCOME', 50.00);
";

/// Connection with the mart tables and sample rows
pub fn seeded_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(ROWS).unwrap();
    conn
}

/// Service over the mart tables and sample rows
pub fn seeded_service() -> Arc<DuckdbService> {
    let service = DuckdbService::open(&DatabaseTarget::Duckdb { path: None }).unwrap();
    {
        let conn = service.conn().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(ROWS).unwrap();
    }
    Arc::new(service)
}

/// Service with the mart tables but no rows
pub fn empty_service() -> Arc<DuckdbService> {
    let service = DuckdbService::open(&DatabaseTarget::Duckdb { path: None }).unwrap();
    service.conn().unwrap().execute_batch(SCHEMA).unwrap();
    Arc::new(service)
}

/// Service without the mart schema (every fact query fails)
pub fn bare_service() -> Arc<DuckdbService> {
    Arc::new(DuckdbService::open(&DatabaseTarget::Duckdb { path: None }).unwrap())
}
